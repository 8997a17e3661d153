use std::collections::HashSet;

/// Run-scoped sets of values already seen on earlier pages
///
/// Each `check_*` method reports whether the value was seen before and records
/// it. Empty values are neither recorded nor flagged.
#[derive(Debug, Default)]
pub struct DuplicationTrackers {
    titles: HashSet<String>,
    descriptions: HashSet<String>,
    content_hashes: HashSet<String>,
}

impl DuplicationTrackers {
    /// Creates empty trackers for a new run
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the trimmed title appeared on an earlier page
    pub fn check_title(&mut self, title: &str) -> bool {
        check(&mut self.titles, title.trim())
    }

    /// Returns true if the trimmed description appeared on an earlier page
    pub fn check_description(&mut self, description: &str) -> bool {
        check(&mut self.descriptions, description.trim())
    }

    /// Returns true if the content hash appeared on an earlier page
    pub fn check_content(&mut self, hash: &str) -> bool {
        check(&mut self.content_hashes, hash)
    }
}

fn check(seen: &mut HashSet<String>, value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    !seen.insert(value.to_string())
}
