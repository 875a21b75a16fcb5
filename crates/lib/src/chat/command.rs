//! Navigation commands typed into the chat room, e.g. `go to resident R1` or `open groups`.
//!
//! Grammar: `VERB KIND [ID]`. Keywords are case-insensitive, the identifier keeps its case
//! and nothing may follow it.

use crate::model::Kind;
use crate::route::Route;

const VERBS: &[&[&str]] = &[&["go", "to"], &["navigate", "to"], &["goto"], &["open"], &["show"]];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavCommand {
    pub kind: Kind,
    pub id: Option<String>,
}

impl NavCommand {
    pub fn route(&self) -> Route {
        match &self.id {
            Some(id) => Route::select(self.kind, id),
            None => Route::list(self.kind),
        }
    }
}

fn parse_kind(word: &str) -> Option<Kind> {
    match word.to_ascii_lowercase().as_str() {
        "resident" | "residents" => Some(Kind::Residents),
        "group" | "groups" => Some(Kind::Groups),
        "model" | "models" => Some(Kind::Models),
        _ => None,
    }
}

/// Parse a message body; anything not matching the grammar exactly is None.
pub fn parse(body: &str) -> Option<NavCommand> {
    let words: Vec<&str> = body.split_whitespace().collect();
    let rest = VERBS.iter().find_map(|verb| {
        let matches = words.len() >= verb.len()
            && verb
                .iter()
                .zip(&words)
                .all(|(v, w)| w.eq_ignore_ascii_case(v));
        matches.then(|| &words[verb.len()..])
    })?;
    match rest {
        [kind] => Some(NavCommand {
            kind: parse_kind(kind)?,
            id: None,
        }),
        [kind, id] => Some(NavCommand {
            kind: parse_kind(kind)?,
            id: Some(id.to_string()),
        }),
        _ => None,
    }
}
