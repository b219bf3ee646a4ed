use super::*;

const SMALL: &str = r#"
version = "test"
domains = ["general", "sawmill", "kitchen"]
stopwords = ["the", "a"]
inanimate_nouns = ["blade", "pot"]
animate_verbs = ["bit"]
animate_qualities = ["hungry"]
signposts = ['\bas\s+if\b']

[domain_literals]
sawmill = ["blade", "cut"]
kitchen = ["bit"]

[[register_fields]]
name = "consumption"
words = ["bit", "teeth", "hungry"]

[[register_fields]]
name = "violence"
words = ["cut", "bit"]

[[register_fields]]
name = "galley"
words = ["stew"]
domains = ["kitchen"]
"#;

fn small() -> Lexicon {
    Lexicon::from_toml_str(SMALL).unwrap()
}

fn err(content: &str) -> LexiconError {
    Lexicon::from_toml_str(content).unwrap_err()
}

#[test]
fn test_builtin_loads() {
    let lex = Lexicon::builtin().unwrap();
    assert_eq!(lex.version(), Some("3.0"));
    assert!(lex.domain("sawmill").is_some());
    assert!(lex.domain("general").is_some());
    assert_eq!(lex.fields().len(), 6);
}

#[test]
fn test_signpost_match() {
    let lex = Lexicon::builtin().unwrap();
    assert!(lex.signpost_match("it moved as if alive").is_some());
    assert!(lex.signpost_match("that's the trouble").is_some());
    assert!(lex.signpost_match("the saw ran all day").is_none());
}

#[test]
fn test_builtin_sawmill_fixture_words() {
    let lex = Lexicon::builtin().unwrap();
    let sawmill = lex.domain("sawmill").unwrap();
    assert!(lex.is_figurative_bearing("bit", sawmill));
    assert!(lex.is_figurative_bearing("teeth", sawmill));
    assert!(!lex.is_figurative_bearing("blade", sawmill));
    assert!(lex.is_animate_verb("bit"));
    assert!(lex.is_inanimate("blade"));
}

#[test]
fn test_domain_literal_is_domain_specific() {
    let lex = small();
    let sawmill = lex.domain("sawmill").unwrap();
    let kitchen = lex.domain("kitchen").unwrap();
    assert!(lex.is_domain_literal("cut", sawmill));
    assert!(!lex.is_domain_literal("cut", kitchen));
    assert!(lex.is_figurative_bearing("cut", kitchen));
    assert!(!lex.is_figurative_bearing("cut", sawmill));
}

#[test]
fn test_fields_of_in_lexicon_order() {
    let lex = small();
    let general = lex.domain("general").unwrap();
    let names: Vec<&str> = lex
        .fields_of("bit", general)
        .map(|id| lex.field(id).name.as_str())
        .collect();
    assert_eq!(names, vec!["consumption", "violence"]);
    assert_eq!(lex.fields_of("oak", general).count(), 0);
}

#[test]
fn test_domain_restricted_field() {
    let lex = small();
    assert!(!lex.is_register_word("stew", lex.domain("general").unwrap()));
    assert!(lex.is_register_word("stew", lex.domain("kitchen").unwrap()));
}

#[test]
fn test_summary_counts() {
    let summary = small().summary();
    assert_eq!(summary.domains[1], ("sawmill".to_string(), 2));
    assert_eq!(summary.register_fields[2].domains, vec!["kitchen"]);
    assert_eq!(summary.signposts, 1);
}

#[test]
fn test_unknown_domain_in_literals() {
    let bad = SMALL.replace("kitchen = [\"bit\"]", "bakery = [\"bit\"]");
    assert!(matches!(err(&bad), LexiconError::UnknownDomain { domain, .. } if domain == "bakery"));
}

#[test]
fn test_unknown_domain_in_field() {
    let bad = SMALL.replace("domains = [\"kitchen\"]", "domains = [\"galley\"]");
    assert!(matches!(err(&bad), LexiconError::UnknownDomain { .. }));
}

#[test]
fn test_duplicate_entry() {
    let bad = SMALL.replace("[\"cut\", \"bit\"]", "[\"cut\", \"bit\", \"cut\"]");
    assert!(matches!(err(&bad), LexiconError::DuplicateEntry { word, .. } if word == "cut"));
}

#[test]
fn test_duplicate_domain() {
    let bad = SMALL.replace(
        "domains = [\"general\", \"sawmill\", \"kitchen\"]",
        "domains = [\"general\", \"sawmill\", \"general\"]",
    );
    assert!(matches!(err(&bad), LexiconError::DuplicateDomain(d) if d == "general"));
}

#[test]
fn test_duplicate_field() {
    let bad = SMALL.replace("name = \"galley\"", "name = \"violence\"");
    assert!(matches!(err(&bad), LexiconError::DuplicateField(f) if f == "violence"));
}

#[test]
fn test_stopword_conflict() {
    let bad = SMALL.replace("[\"stew\"]", "[\"stew\", \"the\"]");
    assert!(matches!(err(&bad), LexiconError::StopwordConflict { word, .. } if word == "the"));
}

#[test]
fn test_non_normalized_entry() {
    let bad = SMALL.replace("[\"blade\", \"pot\"]", "[\"Blade\", \"pot\"]");
    assert!(matches!(err(&bad), LexiconError::InvalidEntry { .. }));
}

#[test]
fn test_invalid_signpost() {
    let bad = SMALL.replace(r"'\bas\s+if\b'", "'(unclosed'");
    assert!(matches!(err(&bad), LexiconError::InvalidPattern { .. }));
}

#[test]
fn test_empty_domains() {
    assert!(matches!(err("domains = []"), LexiconError::NoDomains));
}

#[test]
fn test_unknown_key_rejected() {
    let bad = format!("{SMALL}\nextra = 1\n");
    // lands inside the last [[register_fields]] table
    assert!(matches!(err(&bad), LexiconError::Parse(_)));
}

#[test]
fn test_load_missing_file() {
    let e = Lexicon::load(Path::new("/nonexistent/lexicon.toml")).unwrap_err();
    assert!(matches!(e, LexiconError::Io { .. }));
}
