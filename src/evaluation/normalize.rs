pub fn normalize_text(text: &str) -> String {
    let lines = text
        .replace("\r\n", "\n")
        .split('\n')
        .map(condense_whitespace)
        .collect::<Vec<String>>();

    let Some(first) = lines.iter().position(|line| !line.is_empty()) else {
        return String::new();
    };
    let last = lines
        .iter()
        .rposition(|line| !line.is_empty())
        .unwrap_or(first);

    lines[first..=last].join("\n")
}

fn condense_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<&str>>().join(" ")
}
