use super::{StatsOutput, TreeOutput};
use crate::render::LineKind;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::error::Error;
use std::io::Cursor;

pub fn render_tree(data: &TreeOutput) -> Result<String, Box<dyn Error>> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let tree = BytesStart::new("tree");
    writer.write_event(Event::Start(tree.borrow()))?;

    write_element(&mut writer, "project", &data.project)?;

    let entries = BytesStart::new("entries");
    writer.write_event(Event::Start(entries.borrow()))?;

    for line in data.entries {
        let mut elem = match line.kind {
            LineKind::Directory => BytesStart::new("directory"),
            LineKind::File { .. } => BytesStart::new("file"),
        };
        elem.push_attribute(("path", line.path.as_str()));
        if let LineKind::File { tokens: Some(tokens) } = line.kind {
            elem.push_attribute(("tokens", tokens.to_string().as_str()));
        }
        writer.write_event(Event::Empty(elem))?;
    }

    writer.write_event(Event::End(BytesEnd::new("entries")))?;
    writer.write_event(Event::End(BytesEnd::new("tree")))?;

    let result = writer.into_inner().into_inner();
    Ok(String::from_utf8(result)?)
}

pub fn render_stats(data: &StatsOutput) -> Result<String, Box<dyn Error>> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let repository = BytesStart::new("repository");
    writer.write_event(Event::Start(repository.borrow()))?;

    let metrics = data.metrics;
    write_element(&mut writer, "project", &data.project)?;
    write_element(&mut writer, "total_files", &metrics.total_files.to_string())?;
    write_element(&mut writer, "total_tokens", &metrics.total_tokens.to_string())?;

    let extensions = BytesStart::new("extensions");
    writer.write_event(Event::Start(extensions.borrow()))?;
    for (ext, stats) in &metrics.per_extension {
        let mut elem = BytesStart::new("extension");
        elem.push_attribute(("name", ext.as_str()));
        elem.push_attribute(("count", stats.count.to_string().as_str()));
        elem.push_attribute(("tokens", stats.tokens.to_string().as_str()));
        writer.write_event(Event::Empty(elem))?;
    }
    writer.write_event(Event::End(BytesEnd::new("extensions")))?;

    let top = BytesStart::new("top_files");
    writer.write_event(Event::Start(top.borrow()))?;
    for file in &metrics.top_files {
        let mut elem = BytesStart::new("file");
        elem.push_attribute(("path", file.path.as_str()));
        elem.push_attribute(("tokens", file.tokens.to_string().as_str()));
        writer.write_event(Event::Empty(elem))?;
    }
    writer.write_event(Event::End(BytesEnd::new("top_files")))?;

    writer.write_event(Event::End(BytesEnd::new("repository")))?;

    let result = writer.into_inner().into_inner();
    Ok(String::from_utf8(result)?)
}

fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    content: &str,
) -> Result<(), Box<dyn Error>> {
    let elem = BytesStart::new(name);
    writer.write_event(Event::Start(elem.borrow()))?;
    writer.write_event(Event::Text(BytesText::new(content)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
