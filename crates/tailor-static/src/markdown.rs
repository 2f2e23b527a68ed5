//! Markdown rendering.

use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use tailor_config::Highlighter;

/// Render markdown to HTML.
///
/// With a highlighter, fenced code blocks are replaced by its output.
pub fn render_markdown(content: &str, highlighter: Option<&dyn Highlighter>) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let parser = Parser::new_ext(content, options);
    let mut html_output = String::new();

    match highlighter {
        Some(highlighter) => {
            html::push_html(&mut html_output, highlight_code_blocks(parser, highlighter))
        }
        None => html::push_html(&mut html_output, parser),
    }

    html_output
}

fn highlight_code_blocks<'a>(
    parser: Parser<'a>,
    highlighter: &dyn Highlighter,
) -> impl Iterator<Item = Event<'a>> {
    let mut events = Vec::new();
    // (language, source)
    let mut current: Option<(Option<String>, String)> = None;

    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().map(str::to_string)
                    }
                    CodeBlockKind::Indented => None,
                };
                current = Some((lang, String::new()));
            }

            Event::Text(text) if current.is_some() => {
                if let Some((_, source)) = current.as_mut() {
                    source.push_str(&text);
                }
            }

            Event::End(TagEnd::CodeBlock) => {
                if let Some((lang, source)) = current.take() {
                    let highlighted = highlighter.highlight(&source, lang.as_deref());
                    events.push(Event::Html(highlighted.into()));
                }
            }

            other => events.push(other),
        }
    }

    events.into_iter()
}
