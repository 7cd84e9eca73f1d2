use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Widget;

/// Single-line text input: prompt, typed text, block cursor at the end.
pub struct TextInput<'a> {
    pub prompt: &'a str,
    pub text: &'a str,
    pub style: Style,
}

impl<'a> TextInput<'a> {
    pub fn new(prompt: &'a str, text: &'a str) -> Self {
        Self {
            prompt,
            text,
            style: Style::default().fg(Color::White),
        }
    }
}

impl Widget for TextInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let display = format!("{}{}\u{2588}", self.prompt, self.text);
        let max_width = area.width as usize;
        // Keep the rightmost portion when the text outgrows the area.
        let chars: Vec<char> = display.chars().collect();
        let visible: String = if chars.len() > max_width {
            chars[chars.len() - max_width..].iter().collect()
        } else {
            display
        };

        buf.set_string(area.x, area.y, &visible, self.style);
    }
}
