//! Highlighting scenarios run through the monitor.

use sarissa_monitor::document::InputDocument;
use sarissa_monitor::error::Result;
use sarissa_monitor::matcher::HighlightingStrategy;
use sarissa_monitor::matches::{HighlightsMatch, Hit, Matches};
use sarissa_monitor::monitor::{Monitor, MonitorQuery};
use sarissa_monitor::presearcher::{MatchAllPresearcher, TermFilteredPresearcher};
use sarissa_monitor::query::{
    DisjunctionMaxQuery, Metadata, PrefixQuery, Query, RegexpQuery, SpanNearQuery,
    StandardQueryParser, TermQuery,
};

const FIELD: &str = "field";

fn monitor() -> Result<Monitor> {
    Monitor::new(StandardQueryParser::new(FIELD), MatchAllPresearcher::new())
}

fn doc(text: &str) -> InputDocument {
    InputDocument::builder("doc1").add_text(FIELD, text).build()
}

fn highlight(monitor: &Monitor, text: &str) -> Result<Matches<HighlightsMatch>> {
    monitor.match_document(doc(text), &HighlightingStrategy::new())
}

/// A monitor whose parser hands out a fixed query for every registration.
fn fixed_query_monitor<F>(build: F) -> Result<Monitor>
where
    F: Fn() -> Result<Box<dyn Query>> + Send + Sync + 'static,
{
    let parser = move |_text: &str, _metadata: &Metadata| build();
    Monitor::new(parser, MatchAllPresearcher::new())
}

#[test]
fn test_single_term_query_matches_single_document() -> Result<()> {
    let monitor = monitor()?;
    monitor.register(vec![MonitorQuery::new("query1", "test")])?;

    let matches = highlight(&monitor, "this is a test document")?;

    assert_eq!(matches.match_count(), 1);
    let m = matches.matches("doc1", "query1").unwrap();
    assert_eq!(m.hit_count(), 1);
    assert_eq!(m.hits(FIELD), vec![Hit::new(3, 10, 3, 14)]);
    assert_eq!(
        m.to_string(),
        "Match(doc=doc1,query=query1){hits={field=[3(10)->3(14)]}}"
    );
    Ok(())
}

#[test]
fn test_phrase_reports_each_term() -> Result<()> {
    let monitor = monitor()?;
    monitor.register(vec![MonitorQuery::new("query1", "\"test document\"")])?;

    let matches = highlight(&monitor, "this is a test document")?;
    let m = matches.matches("doc1", "query1").unwrap();
    assert_eq!(
        m.hits(FIELD),
        vec![Hit::new(3, 10, 3, 14), Hit::new(4, 15, 4, 23)]
    );

    let matches = highlight(&monitor, "a document test")?;
    assert_eq!(matches.match_count(), 0);
    Ok(())
}

#[test]
fn test_multi_field_query_matches() -> Result<()> {
    let monitor = monitor()?;
    monitor.register(vec![MonitorQuery::new("query1", "field1:test field2:test")])?;

    let doc = InputDocument::builder("doc1")
        .add_text("field1", "this is a test of field one")
        .add_text("field2", "and this is an additional test")
        .build();
    let matches = monitor.match_document(doc, &HighlightingStrategy::new())?;

    let m = matches.matches("doc1", "query1").unwrap();
    assert_eq!(m.fields().collect::<Vec<_>>(), vec!["field1", "field2"]);
    assert_eq!(m.hits("field1"), vec![Hit::new(3, 10, 3, 14)]);
    assert_eq!(m.hits("field2"), vec![Hit::new(5, 26, 5, 30)]);
    assert_eq!(m.hit_count(), 2);
    Ok(())
}

#[test]
fn test_query_errors_are_isolated() -> Result<()> {
    let monitor = monitor()?;
    let errors = monitor.register(vec![
        MonitorQuery::new("1", "test"),
        MonitorQuery::new("2", "error!"),
        MonitorQuery::new("3", "document"),
        MonitorQuery::new("4", "foo"),
    ])?;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].query_id, "2");

    let matches = highlight(&monitor, "this is a test document")?;

    assert_eq!(matches.queries_run(), 3);
    assert_eq!(matches.match_count(), 2);
    assert_eq!(matches.errors().len(), 1);
    assert_eq!(matches.errors()[0].query, "error!");
    Ok(())
}

#[test]
fn test_regexp_query_highlights() -> Result<()> {
    let monitor =
        fixed_query_monitor(|| Ok(Box::new(RegexpQuery::new(FIELD, "he.*")?) as Box<dyn Query>))?;
    monitor.register(vec![MonitorQuery::new("1", "/he.*/")])?;

    let matches = highlight(&monitor, "hello world")?;
    assert_eq!(matches.matches("doc1", "1").unwrap().hit_count(), 1);
    Ok(())
}

#[test]
fn test_required_prefix_and_excluded_term() -> Result<()> {
    let monitor = monitor()?;
    monitor.register(vec![MonitorQuery::new("1", "+term1 +term2* -term3")])?;

    let matches = highlight(&monitor, "term1 term22 term4")?;
    let m = matches.matches("doc1", "1").unwrap();
    assert_eq!(m.hit_count(), 2);
    assert_eq!(
        m.hits(FIELD),
        vec![Hit::new(0, 0, 0, 5), Hit::new(1, 6, 1, 12)]
    );
    assert!(matches.errors().is_empty());

    let matches = highlight(&monitor, "term1 term22 term3")?;
    assert_eq!(matches.match_count(), 0);
    Ok(())
}

#[test]
fn test_disjunction_max_query() -> Result<()> {
    let monitor = fixed_query_monitor(|| {
        Ok(Box::new(DisjunctionMaxQuery::new(
            vec![
                Box::new(TermQuery::new(FIELD, "term1")),
                Box::new(PrefixQuery::new(FIELD, "term2")),
            ],
            0.0,
        )) as Box<dyn Query>)
    })?;
    monitor.register(vec![MonitorQuery::new("1", "term1 | term2*")])?;

    let matches = highlight(&monitor, "term1 term2 term3")?;
    assert_eq!(matches.queries_run(), 1);
    assert_eq!(matches.matches("doc1", "1").unwrap().hit_count(), 2);
    Ok(())
}

#[test]
fn test_identical_clauses_report_one_hit() -> Result<()> {
    let monitor = monitor()?;
    monitor.register(vec![MonitorQuery::new("1", "+term1 term1")])?;

    let matches = highlight(&monitor, "term1 term2 term3")?;
    assert_eq!(matches.matches("doc1", "1").unwrap().hit_count(), 1);
    Ok(())
}

#[test]
fn test_nested_exclusion_is_stable_across_runs() -> Result<()> {
    let monitor = Monitor::new(StandardQueryParser::new(FIELD), TermFilteredPresearcher::new())?;
    monitor.register(vec![MonitorQuery::new("1", "+term2* -(+(+term1*))")])?;

    for _ in 0..2 {
        let matches = highlight(&monitor, "term2 term")?;
        assert_eq!(matches.match_count(), 1);
        assert_eq!(matches.matches("doc1", "1").unwrap().hit_count(), 1);
    }

    let matches = highlight(&monitor, "term2 term1")?;
    assert_eq!(matches.match_count(), 0);
    Ok(())
}

#[test]
fn test_span_near_with_prefix_clause() -> Result<()> {
    let monitor = fixed_query_monitor(|| {
        Ok(Box::new(SpanNearQuery::new(
            vec![
                Box::new(PrefixQuery::new(FIELD, "term")),
                Box::new(TermQuery::new(FIELD, "foo")),
            ],
            0,
            true,
        )) as Box<dyn Query>)
    })?;
    monitor.register(vec![MonitorQuery::new("1", "spannear")])?;

    let matches = highlight(&monitor, "term1 foo")?;
    let m = matches.matches("doc1", "1").unwrap();
    assert_eq!(m.hit_count(), 2);
    assert_eq!(
        m.hits(FIELD),
        vec![Hit::new(0, 0, 0, 5), Hit::new(1, 6, 1, 9)]
    );

    let matches = highlight(&monitor, "foo term1")?;
    assert_eq!(matches.match_count(), 0);
    Ok(())
}

#[test]
fn test_highlight_query_may_differ_from_match_query() -> Result<()> {
    struct ExpandingParser;

    impl sarissa_monitor::query::QueryParser for ExpandingParser {
        fn parse(&self, _text: &str, _metadata: &Metadata) -> Result<Box<dyn Query>> {
            Ok(Box::new(TermQuery::new(FIELD, "alpha")))
        }

        fn parse_highlight(&self, _text: &str, _metadata: &Metadata) -> Result<Box<dyn Query>> {
            Ok(Box::new(PrefixQuery::new(FIELD, "al")))
        }
    }

    let monitor = Monitor::new(ExpandingParser, MatchAllPresearcher::new())?;
    monitor.register(vec![MonitorQuery::new("1", "alpha")])?;

    let matches = highlight(&monitor, "alpha beta also")?;
    let m = matches.matches("doc1", "1").unwrap();
    assert_eq!(
        m.hits(FIELD),
        vec![Hit::new(0, 0, 0, 5), Hit::new(2, 11, 2, 15)]
    );
    Ok(())
}

#[test]
fn test_equal_runs_give_equal_matches() -> Result<()> {
    let monitor = monitor()?;
    monitor.register(vec![MonitorQuery::new("1", "test OR document")])?;

    let first = highlight(&monitor, "this is a test document")?;
    let second = highlight(&monitor, "this is a test document")?;

    let a = first.matches("doc1", "1").unwrap();
    let b = second.matches("doc1", "1").unwrap();
    assert_eq!(a, b);
    assert_eq!(a.hit_count(), 2);
    Ok(())
}
