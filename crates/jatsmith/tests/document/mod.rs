use jatsmith::{contrib::ORCID_BASE_URL, document::to_jats};

use super::*;

#[test]
fn test_scenario_single_author() {
  let xml = writer().write(&scenario(), "");
  let elements = parse(&xml);

  assert_eq!(named(&elements, "contrib").len(), 1);
  assert_eq!(named(&elements, "surname")[0].text, "Silva");
  assert_eq!(named(&elements, "given-names")[0].text, "Maria");

  let affs = named(&elements, "aff");
  assert_eq!(affs.len(), 1);
  let country = named(&elements, "country")[0];
  assert_eq!(country.attrs.get("country").map(String::as_str), Some("BR"));
  assert_eq!(country.text, "Brasil");

  assert!(named(&elements, "trans-title-group").is_empty());
  assert!(named(&elements, "trans-abstract").is_empty());
  assert!(named(&elements, "article-id").is_empty());
  assert!(xml.contains("<!-- DOI not available"));
}

#[test]
fn test_cross_references_line_up() {
  let mut metadata = scenario();
  // Identical authors still get distinct, dense ids
  metadata.authors = vec![
    author("Ana Souza", "USP", "Brasil"),
    author("Ana Souza", "USP", "Brasil"),
    author("John Doe", "MIT", "United States"),
  ];
  let elements = parse(&writer().write(&metadata, ""));

  let xrefs = named(&elements, "xref");
  let affs = named(&elements, "aff");
  assert_eq!(named(&elements, "contrib").len(), 3);
  assert_eq!(xrefs.len(), 3);
  assert_eq!(affs.len(), 3);

  for (i, (xref, aff)) in xrefs.iter().zip(&affs).enumerate() {
    let id = format!("aff{}", i + 1);
    assert_eq!(xref.attrs["rid"], id);
    assert_eq!(xref.attrs["ref-type"], "aff");
    assert_eq!(aff.attrs["id"], id);
  }
  let labels: Vec<_> = named(&elements, "label").iter().map(|l| l.text.clone()).collect();
  assert_eq!(&labels[..3], ["1", "2", "3"]);
  assert_eq!(named(&elements, "country")[2].attrs["country"], "US");
}

#[test]
fn test_markup_characters_survive_a_parse() {
  let tricky = r#"Tom & "Jerry" <'cats'> &amp;"#;
  let metadata = Metadata {
    title: tricky.to_string(),
    title_en: tricky.to_string(),
    journal: tricky.to_string(),
    abstract_text: tricky.to_string(),
    doi: tricky.to_string(),
    keywords: "a<b, c&d".to_string(),
    authors: vec![Author {
      name: "Ana O'Neil".to_string(),
      affiliation: tricky.to_string(),
      email: "a&b@example.org".to_string(),
      orcid: "https://orcid.org/0000-0001?x=<1>&y='2'".to_string(),
      country: tricky.to_string(),
      ..Author::default()
    }],
    ..Metadata::default()
  };
  let elements = parse(&writer().write(&metadata, tricky));

  for name in
    ["article-title", "trans-title", "journal-title", "institution", "country", "article-id"]
  {
    assert_eq!(named(&elements, name)[0].text, tricky, "{name}");
  }
  assert_eq!(named(&elements, "surname")[0].text, "O'Neil");
  assert_eq!(named(&elements, "email")[0].text, "a&b@example.org");
  assert_eq!(named(&elements, "contrib-id")[0].text, "https://orcid.org/0000-0001?x=<1>&y='2'");
  let kwds: Vec<_> = named(&elements, "kwd").iter().map(|k| k.text.clone()).collect();
  assert_eq!(kwds, ["a<b", "c&d"]);
  let paragraphs = named(&elements, "p");
  assert!(paragraphs.iter().any(|p| p.text == tricky));
}

#[test]
fn test_translated_title_only_when_given() {
  let mut metadata = scenario();
  let elements = parse(&writer().write(&metadata, ""));
  assert!(named(&elements, "trans-title-group").is_empty());

  metadata.title_en = "Foo".to_string();
  let elements = parse(&writer().write(&metadata, ""));
  let groups = named(&elements, "trans-title-group");
  assert_eq!(groups.len(), 1);
  assert_eq!(groups[0].attrs["xml:lang"], "en");
  assert_eq!(named(&elements, "trans-title")[0].text, "Foo");
}

#[test]
fn test_keyword_groups() {
  let mut metadata = scenario();
  metadata.keywords = "a, b,,c ".to_string();
  let elements = parse(&writer().write(&metadata, ""));
  let kwds: Vec<_> = named(&elements, "kwd").iter().map(|k| k.text.clone()).collect();
  assert_eq!(kwds, ["a", "b", "c"]);
  assert_eq!(named(&elements, "kwd-group").len(), 1);

  metadata.keywords_en = "x , y".to_string();
  let elements = parse(&writer().write(&metadata, ""));
  let groups = named(&elements, "kwd-group");
  assert_eq!(groups.len(), 2);
  assert_eq!(groups[1].attrs["xml:lang"], "en");
  assert_eq!(named(&elements, "kwd").len(), 5);
}

#[test]
fn test_orcid_and_email_blocks() {
  let mut metadata = scenario();
  metadata.authors.push(Author {
    name: "Lee".to_string(),
    orcid: "0000-0002-1825-0097".to_string(),
    email: "lee@example.org".to_string(),
    ..Author::default()
  });
  let elements = parse(&writer().write(&metadata, ""));

  let ids = named(&elements, "contrib-id");
  assert_eq!(ids.len(), 1);
  assert_eq!(ids[0].attrs["contrib-id-type"], "orcid");
  assert_eq!(ids[0].text, format!("{ORCID_BASE_URL}0000-0002-1825-0097"));
  assert_eq!(named(&elements, "email").len(), 1);

  // Single token names become the surname
  assert_eq!(named(&elements, "surname")[1].text, "Lee");
  assert_eq!(named(&elements, "given-names")[1].text, "");
  // Unknown country: text without the attribute
  assert!(!named(&elements, "country")[1].attrs.contains_key("country"));
}

#[test]
fn test_body_paragraphs() {
  let elements = parse(&writer().write(&scenario(), "Intro.\n\nMethods.\nResults."));
  let texts: Vec<_> = named(&elements, "p").iter().map(|p| p.text.clone()).collect();
  assert!(texts.ends_with(&["Intro.".to_string(), "Methods.".to_string(), "Results.".to_string()]));
}

#[test]
fn test_empty_record_is_well_formed() {
  let xml = to_jats(&Metadata::blank(""), "");
  let elements = parse(&xml);
  assert_eq!(elements[0].name, "article");
  assert_eq!(elements[0].attrs["specific-use"], "sps-1.9");
  assert_eq!(elements[0].attrs["xml:lang"], "es");
  assert_eq!(named(&elements, "contrib").len(), 1);
  assert_eq!(named(&elements, "ref").len(), 1);
  assert_eq!(named(&elements, "license").len(), 1);
}

#[test]
fn test_boilerplate_is_constant_across_records() {
  let first = writer().write(&scenario(), "");
  let mut other = scenario();
  other.title = "Other".to_string();
  let second = writer().write(&other, "");

  let tail = |xml: &str| xml[xml.find("<back>").unwrap()..].to_string();
  assert_eq!(tail(&first), tail(&second));
  let head = |xml: &str| xml.lines().take(3).collect::<Vec<_>>().join("\n");
  assert_eq!(head(&first), head(&second));
}

#[test]
fn test_concurrent_calls_agree() -> TestResult<()> {
  let metadata = &scenario();
  let writer = &writer();
  let expected = writer.write(metadata, "body");
  std::thread::scope(|s| {
    let handles: Vec<_> =
      (0..4).map(|_| s.spawn(move || writer.write(metadata, "body"))).collect();
    for handle in handles {
      assert_eq!(handle.join().unwrap(), expected);
    }
  });
  Ok(())
}
