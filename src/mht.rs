//! Reader for MHT (MIME HTML) web archives, the format a note application publishes
//! a single page to: one `text/html` part, its images, and an optional `filelist.xml`.

use std::borrow::Cow;
use std::collections::HashMap;

use mail_parser::{MessageParser, MessagePart, MimeHeaders};

use crate::error::Error;

pub(crate) const OFFICE_NS: &str = "urn:schemas-microsoft-com:office:office";

const IMAGE_SUBTYPES: &[&str] = &["png", "jpeg", "jpg"];

/// `(type, subtype)` of a part, lowercased. Parts without a header are `text/plain`.
fn mime_type(part: &MessagePart<'_>) -> (String, String) {
    match part.content_type() {
        Some(ct) => (
            ct.ctype().to_ascii_lowercase(),
            ct.subtype().unwrap_or_default().to_ascii_lowercase(),
        ),
        None => ("text".to_string(), "plain".to_string()),
    }
}

/// Text of a part, decoded from its declared charset when it is a text part.
fn part_text<'a>(part: &'a MessagePart<'_>) -> Cow<'a, str> {
    match part.text_contents() {
        Some(text) => Cow::Borrowed(text),
        None => String::from_utf8_lossy(part.contents()),
    }
}

/// `<mainfile-stem>_files` plus the hrefs of every listed file.
fn parse_file_list(xml: &str) -> Result<Option<(String, Vec<String>)>, Error> {
    let doc = roxmltree::Document::parse(xml)?;
    let root = doc.root_element();
    let in_office = |n: &roxmltree::Node, name: &str| {
        n.tag_name().name() == name && n.tag_name().namespace() == Some(OFFICE_NS)
    };
    let Some(main) = root
        .children()
        .find(|n| in_office(n, "MainFile"))
        .and_then(|n| n.attribute("HRef"))
    else {
        return Ok(None);
    };
    let file_name = main.rsplit('/').next().unwrap_or(main);
    let stem = file_name.rsplit_once('.').map_or(file_name, |(stem, _)| stem);
    let files = root
        .children()
        .filter(|n| in_office(n, "File"))
        .filter_map(|n| n.attribute("HRef"))
        .map(str::to_string)
        .collect();
    Ok(Some((format!("{stem}_files"), files)))
}

fn is_image_href(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    [".png", ".jpg", ".jpeg"].iter().any(|ext| lower.ends_with(ext))
}

/// Extract the page HTML and its images from an MHT archive.
pub fn extract(bytes: &[u8]) -> Result<(String, HashMap<String, Vec<u8>>), Error> {
    let message = MessageParser::default()
        .parse(bytes)
        .ok_or_else(|| Error::InvalidArchive("not a MIME document".into()))?;
    let typed: Vec<(&MessagePart<'_>, (String, String))> =
        message.parts.iter().map(|p| (p, mime_type(p))).collect();

    let html = typed
        .iter()
        .find(|(_, (ty, sub))| ty == "text" && sub == "html")
        .map(|(part, _)| part_text(part).into_owned())
        .ok_or_else(|| Error::InvalidArchive("no text/html part".into()))?;

    let file_list = match typed.iter().find(|(_, (ty, sub))| ty == "text" && sub == "xml") {
        Some((part, _)) => parse_file_list(&part_text(part))?,
        None => None,
    };

    let mut images = HashMap::new();
    for (part, _) in typed
        .iter()
        .filter(|(_, (ty, sub))| ty == "image" && IMAGE_SUBTYPES.contains(&sub.as_str()))
    {
        let location = part.content_location().unwrap_or_default();
        let listed = file_list.as_ref().and_then(|(dir, files)| {
            files
                .iter()
                .filter(|href| is_image_href(href))
                .find(|href| location.ends_with(href.as_str()))
                .map(|href| format!("{dir}/{href}"))
        });
        let key = listed.unwrap_or_else(|| location.to_string());
        let body = part.contents().to_vec();
        log::debug!("MHT image {key:?} ({} bytes)", body.len());
        images.insert(key, body);
    }
    Ok((html, images))
}
