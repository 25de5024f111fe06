//! Constrained inline markup for question, option and explanation text.
//!
//! Only `<b>`, `<strong>`, `<i>`, `<em>` and `<code>` are recognised. Every other
//! angle-bracket sequence is treated as literal text, so stored content can never
//! inject arbitrary markup into a renderer.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub style: Style,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Bold,
    Italic,
    Code,
}

impl Tag {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "b" | "strong" => Some(Tag::Bold),
            "i" | "em" => Some(Tag::Italic),
            "code" => Some(Tag::Code),
            _ => None,
        }
    }

    fn html(&self) -> &'static str {
        match self {
            Tag::Bold => "b",
            Tag::Italic => "i",
            Tag::Code => "code",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RichText {
    segments: Vec<Segment>,
}

impl RichText {
    pub fn parse(input: &str) -> Self {
        let mut segments: Vec<Segment> = Vec::new();
        let mut depth = [0usize; 3];
        let mut buf = String::new();
        let mut rest = input;

        let style_of = |depth: &[usize; 3]| Style {
            bold: depth[0] > 0,
            italic: depth[1] > 0,
            code: depth[2] > 0,
        };

        while let Some(start) = rest.find('<') {
            buf.push_str(&rest[..start]);
            let after = &rest[start..];

            match parse_tag(after) {
                Some((tag, closing, len)) => {
                    flush(&mut segments, &mut buf, style_of(&depth));
                    let slot = &mut depth[tag as usize];
                    if closing {
                        *slot = slot.saturating_sub(1);
                    } else {
                        *slot += 1;
                    }
                    rest = &after[len..];
                }
                None => {
                    buf.push('<');
                    rest = &after[1..];
                }
            }
        }
        buf.push_str(rest);
        flush(&mut segments, &mut buf, style_of(&depth));

        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn to_plain(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    // Escapes everything, then re-emits only the allowed tags
    pub fn to_safe_html(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            let tags: Vec<Tag> = [
                (segment.style.bold, Tag::Bold),
                (segment.style.italic, Tag::Italic),
                (segment.style.code, Tag::Code),
            ]
            .into_iter()
            .filter_map(|(on, tag)| on.then_some(tag))
            .collect();

            for tag in &tags {
                out.push_str(&format!("<{}>", tag.html()));
            }
            out.push_str(&escape_html(&segment.text));
            for tag in tags.iter().rev() {
                out.push_str(&format!("</{}>", tag.html()));
            }
        }
        out
    }
}

// Returns (tag, is_closing, consumed_len) for a recognised tag at the start of `s`
fn parse_tag(s: &str) -> Option<(Tag, bool, usize)> {
    let end = s.find('>')?;
    let inner = &s[1..end];
    let (closing, name) = match inner.strip_prefix('/') {
        Some(name) => (true, name),
        None => (false, inner),
    };
    let tag = Tag::from_name(name.trim())?;
    Some((tag, closing, end + 1))
}

fn flush(segments: &mut Vec<Segment>, buf: &mut String, style: Style) {
    if buf.is_empty() {
        return;
    }
    let text = std::mem::take(buf);
    match segments.last_mut() {
        Some(last) if last.style == style => last.text.push_str(&text),
        _ => segments.push(Segment { text, style }),
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn plain(input: &str) -> String {
    RichText::parse(input).to_plain()
}
