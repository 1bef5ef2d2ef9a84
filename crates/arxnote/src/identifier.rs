//! Recognition of arXiv identifiers inside search keywords.
//!
//! A keyword typed into the search box is either an arXiv identifier, which is looked up
//! directly, or free text, which goes into an abstract search. Identifiers are accepted as:
//!
//! - URLs: `https://arxiv.org/abs/2101.12345v2`, `https://arxiv.org/pdf/2101.12345.pdf`,
//!   `https://arxiv.org/html/2101.12345v1`, `https://arxiv.org/abs/astro-ph/0601001`
//! - New-style ids: `2101.12345`, optionally versioned `2101.12345v2`
//! - Old-style ids: `astro-ph/0601001`, `math.AG/0601001v1`
//!
//! # Examples
//!
//! ```
//! use arxnote::identifier::{extract_identifier, partition};
//!
//! assert_eq!(
//!   extract_identifier("https://arxiv.org/abs/2101.12345v2").as_deref(),
//!   Some("2101.12345v2")
//! );
//! assert_eq!(extract_identifier("quantum computing"), None);
//!
//! let split = partition(["2101.12345", "quantum computing", ""]);
//! assert_eq!(split.ids, vec!["2101.12345"]);
//! assert_eq!(split.text_terms, vec!["quantum computing"]);
//! ```

use super::*;

lazy_static! {
  static ref ARXIV_URL: Regex = Regex::new(
    r"arxiv\.org/(?:abs|pdf|html)/((?:[a-zA-Z\-\.]+/\d{7}(?:v\d+)?)|[^\s?#/]+)"
  )
  .unwrap();
  static ref PDF_SUFFIX: Regex = Regex::new(r"(?i)\.pdf$").unwrap();
  static ref ARXIV_NEW: Regex = Regex::new(r"^\d{4}\.\d{4,5}(?:v\d+)?$").unwrap();
  static ref ARXIV_OLD: Regex = Regex::new(r"^[a-zA-Z\-\.]+/\d{7}(?:v\d+)?$").unwrap();
}

/// Classification of a single search keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyword {
  /// An arXiv identifier, already extracted from any surrounding URL
  Identifier(String),
  /// Anything else, searched as free text
  Text(String),
}

/// Keywords split into an identifier lookup batch and a free-text batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
  /// Identifiers to fetch directly, in keyword order
  pub ids:        Vec<String>,
  /// Free-text terms to search abstracts for, in keyword order
  pub text_terms: Vec<String>,
}

/// Classifies one raw keyword.
///
/// The keyword is trimmed first. URLs are checked before bare identifiers so that an id
/// embedded in a link is extracted rather than the link being searched as text.
pub fn classify(raw: &str) -> Keyword {
  match extract_identifier(raw) {
    Some(id) => Keyword::Identifier(id),
    None => Keyword::Text(raw.trim().to_string()),
  }
}

/// Extracts an arXiv identifier from `raw`, or `None` if it is free text.
pub fn extract_identifier(raw: &str) -> Option<String> {
  let input = raw.trim();
  if input.is_empty() {
    return None;
  }

  if let Some(id) = ARXIV_URL.captures(input).and_then(|cap| cap.get(1)) {
    return Some(PDF_SUFFIX.replace(id.as_str(), "").into_owned());
  }

  if ARXIV_NEW.is_match(input) || ARXIV_OLD.is_match(input) {
    return Some(input.to_string());
  }

  None
}

/// Splits keywords into identifier and free-text batches, skipping blank keywords.
pub fn partition<I, S>(keywords: I) -> Partition
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>, {
  let mut split = Partition::default();
  for keyword in keywords {
    let keyword = keyword.as_ref();
    if keyword.trim().is_empty() {
      continue;
    }
    match classify(keyword) {
      Keyword::Identifier(id) => split.ids.push(id),
      Keyword::Text(text) => split.text_terms.push(text),
    }
  }
  split
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_urls() {
    let cases = [
      ("https://arxiv.org/abs/2101.12345v2", "2101.12345v2"),
      ("http://arxiv.org/abs/2101.12345", "2101.12345"),
      ("https://arxiv.org/pdf/2101.12345.pdf", "2101.12345"),
      ("https://arxiv.org/pdf/2101.12345v3.PDF", "2101.12345v3"),
      ("https://arxiv.org/pdf/2101.12345v3", "2101.12345v3"),
      ("https://arxiv.org/html/2401.00001v1", "2401.00001v1"),
      ("https://arxiv.org/abs/2101.12345?context=cs", "2101.12345"),
      ("https://arxiv.org/abs/2101.12345#section", "2101.12345"),
      ("https://arxiv.org/abs/astro-ph/0601001", "astro-ph/0601001"),
      ("https://export.arxiv.org/abs/hep-th/9901001v2", "hep-th/9901001v2"),
    ];
    for (input, expected) in cases {
      assert_eq!(extract_identifier(input).as_deref(), Some(expected), "{input}");
    }
  }

  #[test]
  fn test_new_style() {
    assert_eq!(extract_identifier("2101.12345").as_deref(), Some("2101.12345"));
    assert_eq!(extract_identifier("2101.1234").as_deref(), Some("2101.1234"));
    assert_eq!(extract_identifier("  2101.12345v2 ").as_deref(), Some("2101.12345v2"));
    assert_eq!(extract_identifier("2101.123"), None);
    assert_eq!(extract_identifier("2101.123456"), None);
    assert_eq!(extract_identifier("21012.12345"), None);
  }

  #[test]
  fn test_old_style() {
    assert_eq!(extract_identifier("astro-ph/0601001").as_deref(), Some("astro-ph/0601001"));
    assert_eq!(extract_identifier("math.AG/0601001v1").as_deref(), Some("math.AG/0601001v1"));
    assert_eq!(extract_identifier("astro-ph/060100"), None);
  }

  #[test]
  fn test_free_text() {
    assert_eq!(classify("quantum computing"), Keyword::Text("quantum computing".into()));
    assert_eq!(classify("  transformers "), Keyword::Text("transformers".into()));
    assert_eq!(extract_identifier(""), None);
    assert_eq!(extract_identifier("https://example.org/abs/2101.12345"), None);
  }

  #[test]
  fn test_partition_preserves_order() {
    let split = partition(vec![
      "https://arxiv.org/abs/2101.12345",
      "graph neural networks",
      "   ",
      "astro-ph/0601001",
      "diffusion",
    ]);
    assert_eq!(split.ids, vec!["2101.12345", "astro-ph/0601001"]);
    assert_eq!(split.text_terms, vec!["graph neural networks", "diffusion"]);
  }
}
