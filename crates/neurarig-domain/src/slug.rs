//! URL-safe identifiers derived from display names.

/// Lowercase, hyphen-separated slug for `name`.
///
/// ASCII alphanumerics are kept; every run of other characters collapses to
/// one `-`. Names with no usable characters produce `"item"`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("item");
    }
    slug
}

/// Yields `base`, `base-1`, `base-2`, … for linear collision resolution.
#[derive(Debug, Clone)]
pub struct SlugCandidates {
    base: String,
    next: u32,
}

impl SlugCandidates {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            next: 0,
        }
    }
}

impl Iterator for SlugCandidates {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let n = self.next;
        self.next = self.next.checked_add(1)?;
        if n == 0 {
            Some(self.base.clone())
        } else {
            Some(format!("{}-{}", self.base, n))
        }
    }
}
