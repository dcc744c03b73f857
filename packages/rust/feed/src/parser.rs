//! Channel Atom feed parser.
//!
//! Parses the feed format published at `/feeds/videos.xml`:
//! - Feed level: `<title>` (channel display title), optional `<yt:channelId>`
//! - Per `<entry>`: `<yt:videoId>`, `<title>`, `<published>`, all required
//!
//! The parse is all-or-nothing: an entry missing any required field rejects
//! the whole document, so a run never operates on a partial snapshot.

use roxmltree::{Document, Node};

use tubedigest_shared::{ChannelSnapshot, Result, TubedigestError, VideoEntry, watch_url};

/// Atom feed namespace.
const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

/// YouTube feed extension namespace (`yt:` elements).
const YT_NS: &str = "http://www.youtube.com/xml/schemas/2015";

/// Parse raw feed XML into a [`ChannelSnapshot`].
///
/// Pure function: no I/O, no storage. Entry order is preserved exactly as
/// it appears in the document.
pub fn parse_feed(xml: &str) -> Result<ChannelSnapshot> {
    let doc = Document::parse(xml)
        .map_err(|e| TubedigestError::malformed_feed(format!("invalid XML: {e}")))?;

    let feed = doc.root_element();
    if feed.tag_name().name() != "feed" {
        return Err(TubedigestError::malformed_feed(format!(
            "expected <feed> root element, found <{}>",
            feed.tag_name().name()
        )));
    }

    let channel_title = child_text(feed, ATOM_NS, "title")
        .ok_or_else(|| TubedigestError::malformed_feed("feed has no <title>"))?
        .to_string();

    let channel_id = child_text(feed, YT_NS, "channelId").map(str::to_string);

    let mut entries = Vec::new();
    for entry in feed
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "entry")
    {
        entries.push(parse_entry(entry)?);
    }

    Ok(ChannelSnapshot {
        channel_id,
        channel_title,
        entries,
    })
}

/// Parse one `<entry>` element, rejecting it if any required field is absent.
fn parse_entry(entry: Node<'_, '_>) -> Result<VideoEntry> {
    let video_id = child_text(entry, YT_NS, "videoId")
        .ok_or(TubedigestError::MissingField { field: "videoId" })?;

    let title =
        child_text(entry, ATOM_NS, "title").ok_or(TubedigestError::MissingField { field: "title" })?;

    let published = child_text(entry, ATOM_NS, "published")
        .ok_or(TubedigestError::MissingField { field: "published" })?;

    // The timestamp is carried verbatim into the summary footer, but a
    // value that is not a timestamp at all means the document is broken.
    chrono::DateTime::parse_from_rfc3339(published).map_err(|e| {
        TubedigestError::malformed_feed(format!("entry {video_id} has bad <published>: {e}"))
    })?;

    Ok(VideoEntry {
        video_id: video_id.to_string(),
        title: title.to_string(),
        published: published.to_string(),
        url: watch_url(video_id),
    })
}

/// Text content of the first child element with the given namespace and name.
fn child_text<'a>(node: Node<'a, '_>, ns: &str, name: &str) -> Option<&'a str> {
    node.children()
        .find(|n| {
            n.is_element() && n.tag_name().name() == name && n.tag_name().namespace() == Some(ns)
        })
        .and_then(|n| n.text())
}
