use crate::config::IndentStyle;
use std::fmt;

/// Append-only text buffer that remembers the current indentation level.
///
/// Opening or closing a level never writes anything by itself; indentation is
/// only materialised by [`FrameBuffer::write_indent`] and
/// [`FrameBuffer::indent_write`].
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    text: String,
    indent_level: usize,
    indent_chars: String,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::with_indent(&IndentStyle::default())
    }

    pub fn with_indent(style: &IndentStyle) -> Self {
        Self {
            text: String::new(),
            indent_level: 0,
            indent_chars: style.unit(),
        }
    }

    pub fn write(&mut self, text: &str) -> &mut Self {
        self.text.push_str(text);
        self
    }

    pub fn write_float(&mut self, value: f32) -> &mut Self {
        self.text.push_str(&java_float(value));
        self
    }

    pub fn newline(&mut self) -> &mut Self {
        self.text.push('\n');
        self
    }

    pub fn write_indent(&mut self) -> &mut Self {
        for _ in 0..self.indent_level {
            self.text.push_str(&self.indent_chars);
        }
        self
    }

    pub fn indent_write(&mut self, text: &str) -> &mut Self {
        self.write_indent().write(text)
    }

    pub fn open(&mut self) -> &mut Self {
        self.indent_level += 1;
        self
    }

    pub fn close(&mut self) -> &mut Self {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
        self
    }

    pub fn indent_level(&self) -> usize {
        self.indent_level
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Write for FrameBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.text.push_str(s);
        Ok(())
    }
}

/// Float literal in the form the target compiler reads back bit-exactly.
pub fn java_float(value: f32) -> String {
    if value.is_nan() {
        "Float.NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 {
            "Float.POSITIVE_INFINITY".to_string()
        } else {
            "Float.NEGATIVE_INFINITY".to_string()
        }
    } else {
        format!("{:?}f", value)
    }
}
