/// Splits one physical CSV line on commas outside double-quoted spans.
///
/// Quotes only toggle the quoted state and are dropped; `""` is not treated
/// as an escaped quote. Every field is trimmed.
pub fn tokenize_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            other => current.push(other),
        }
    }

    fields.push(current.trim().to_string());
    fields
}
