// End-to-end runs over `data/sample_language.txt`: compile the file, rewrite
// its dictionary with and without syllabification, and generate words.

use wordsmith_lang::{Config, Engine, RunOptions, RunReport, Warning, Word};

const SAMPLE: &str = include_str!("../../data/sample_language.txt");

fn engine(syllabify: bool) -> Engine {
    seeded(syllabify, None)
}

fn seeded(syllabify: bool, seed: Option<u64>) -> Engine {
    let config = Config::from_source(SAMPLE).expect("sample language compiles");
    Engine::new(config, RunOptions { syllabify, seed })
}

fn outputs(report: &RunReport, syllables: bool) -> Vec<String> {
    report
        .results
        .iter()
        .map(|r| {
            if syllables {
                r.output.markup()
            } else {
                r.output.text()
            }
        })
        .collect()
}

#[test]
fn sample_language_compiles() {
    let e = engine(false);
    let config = e.config();
    assert_eq!(config.categories().len(), 6);
    assert_eq!(config.templates().len(), 4);
    assert_eq!(config.rules().len(), 5);
    assert_eq!(config.dictionary().len(), 5);
    assert!(config.syllables().is_some());
    assert!(config.warnings().is_empty());
}

#[test]
fn dictionary_without_syllables() {
    let report = engine(false).run_dictionary();
    assert_eq!(
        outputs(&report, false),
        vec!["banana", "estaba", "ta", "kampa", "logomo"]
    );
    assert_eq!(report.results[1].applied, vec!["P/B/V_V", "/e/#_sP"]);
    assert_eq!(report.results[3].applied, vec!["n/m/_[pb]"]);
    assert!(report.results[0].applied.is_empty());

    // The stress-conditioned rule cannot run on unsyllabified words.
    assert_eq!(report.warnings.len(), 5);
    assert!(
        report
            .warnings
            .iter()
            .all(|w| matches!(w, Warning::ProsodyUnavailable { rule, .. } if rule == "o/u/˘_"))
    );
}

#[test]
fn dictionary_with_syllables() {
    let report = engine(true).run_dictionary();
    assert_eq!(
        outputs(&report, true),
        vec!["ˌba.ˈna.na", "ˌe.ˈsta.ba", "ˈta", "ˌkam.ˈpa", "ˌlo.ˈgo.mu"]
    );
    assert_eq!(report.results[4].applied, vec!["P/B/V_V", "o/u/˘_"]);
    // `tak` ends in a consonant that is no legal coda.
    assert_eq!(
        report.warnings,
        vec![Warning::SyllabificationFallback {
            word: "tak".to_string()
        }]
    );
}

#[test]
fn generation_is_seeded_and_uses_the_inventory() {
    let e = seeded(false, Some(11));
    let first = e.run_generated(300).unwrap();
    let again = e.run_generated(300).unwrap();
    assert_eq!(first, again);
    assert_eq!(first.results.len(), 300);

    let categories = e.config().categories();
    for result in &first.results {
        assert!(!result.input.is_empty());
        for &symbol in result.output.symbols() {
            assert!(
                categories.contains('C', symbol) || categories.contains('V', symbol),
                "unexpected symbol {symbol:?} in {}",
                result.output
            );
        }
    }
}

#[test]
fn generated_words_are_syllabified_on_request() {
    let report = seeded(true, Some(3)).run_generated(50).unwrap();
    assert!(report.results.iter().all(|r| r.output.is_syllabified()));
}

#[test]
fn markup_in_input_is_ignored() {
    let e = engine(false);
    let plain = e.process_word(&Word::from_text("lokomo"));
    let marked = e.process_word(&Word::from_markup("ˈlo.ko.mo"));
    assert_eq!(plain.output, marked.output);
}

#[test]
fn report_serializes_to_json() {
    let report = engine(true).run_dictionary();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["results"][0]["output"]["markup"], "ˌba.ˈna.na");
    assert_eq!(json["warnings"][0]["kind"], "syllabification_fallback");
}
