/// Text cut to a byte budget, plus whether anything was dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Truncated {
    pub text: String,
    pub truncated: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TruncationMode {
    /// Keep the first bytes (file reads, HTTP bodies).
    Head,
    /// Keep the last bytes (command output, where errors land at the end).
    Tail,
}

pub fn truncate_bytes(input: &str, max_bytes: usize, mode: TruncationMode) -> Truncated {
    if input.len() <= max_bytes {
        return Truncated {
            text: input.to_string(),
            truncated: false,
        };
    }

    let text = match mode {
        TruncationMode::Head => {
            let mut end = max_bytes;
            while !input.is_char_boundary(end) {
                end -= 1;
            }
            &input[..end]
        }
        TruncationMode::Tail => {
            let mut start = input.len() - max_bytes;
            while !input.is_char_boundary(start) {
                start += 1;
            }
            &input[start..]
        }
    };
    Truncated {
        text: text.to_string(),
        truncated: true,
    }
}

/// Single-line preview for logs.
pub fn preview(input: &str, max_chars: usize) -> String {
    let flat = input.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut cut: String = flat.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}
