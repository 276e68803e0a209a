//! Query parser that compiles query text into structured queries.
//!
//! The monitor does not care how query text is compiled: anything that
//! implements [`QueryParser`] will do, including plain closures. The
//! [`StandardQueryParser`] understands a Lucene-like syntax:
//!
//! ```text
//! term  field:term  "a phrase"  "a phrase"~2  prefix*  wil?ca*d  /reg.*exp/
//! +required  -excluded  NOT excluded  a AND b  a OR b  (grouped clauses)  term^2.5
//! ```

use std::collections::BTreeMap;
use std::iter::Peekable;
use std::str::CharIndices;
use std::sync::Arc;

use crate::analysis::Analyzer;
use crate::error::{Result, SarissaError};
use crate::query::Query;
use crate::query::boolean::{BooleanClause, BooleanQuery, Occur};
use crate::query::match_all::MatchAllQuery;
use crate::query::prefix::PrefixQuery;
use crate::query::regexp::RegexpQuery;
use crate::query::span::SpanNearQuery;
use crate::query::term::TermQuery;
use crate::query::wildcard::WildcardQuery;

/// Free-form metadata attached to a registered query.
pub type Metadata = BTreeMap<String, String>;

/// Compiles query text into structured queries.
pub trait QueryParser: Send + Sync {
    /// Compile the query used to select matching documents.
    fn parse(&self, query: &str, metadata: &Metadata) -> Result<Box<dyn Query>>;

    /// Compile the query used to extract hits for highlighting.
    fn parse_highlight(&self, query: &str, metadata: &Metadata) -> Result<Box<dyn Query>> {
        self.parse(query, metadata)
    }
}

impl<F> QueryParser for F
where
    F: Fn(&str, &Metadata) -> Result<Box<dyn Query>> + Send + Sync,
{
    fn parse(&self, query: &str, metadata: &Metadata) -> Result<Box<dyn Query>> {
        self(query, metadata)
    }
}

/// Parser for the Lucene-like query syntax.
#[derive(Clone)]
pub struct StandardQueryParser {
    default_field: String,
    default_occur: Occur,
    analyzer: Option<Arc<dyn Analyzer>>,
}

impl std::fmt::Debug for StandardQueryParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardQueryParser")
            .field("default_field", &self.default_field)
            .field("default_occur", &self.default_occur)
            .field("analyzer", &self.analyzer.as_ref().map(|a| a.name()))
            .finish()
    }
}

impl StandardQueryParser {
    /// Create a parser whose bare terms search `default_field`.
    pub fn new<S: Into<String>>(default_field: S) -> Self {
        StandardQueryParser {
            default_field: default_field.into(),
            default_occur: Occur::Should,
            analyzer: None,
        }
    }

    /// Change the field used for terms without a `field:` prefix.
    pub fn with_default_field<S: Into<String>>(mut self, field: S) -> Self {
        self.default_field = field.into();
        self
    }

    /// Occurrence given to clauses that carry no operator.
    pub fn with_default_occur(mut self, occur: Occur) -> Self {
        self.default_occur = occur;
        self
    }

    /// Run plain terms and phrases through `analyzer`.
    ///
    /// A term that analyzes into several tokens becomes a phrase. Wildcard,
    /// prefix and regexp terms are never analyzed.
    pub fn with_analyzer(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Get the default field.
    pub fn default_field(&self) -> &str {
        &self.default_field
    }

    /// Parse query text into a structured query.
    pub fn parse_str(&self, query: &str) -> Result<Box<dyn Query>> {
        let tokens = Lexer::new(query).tokenize()?;
        if tokens.is_empty() {
            return Err(SarissaError::parse("empty query"));
        }

        let mut parser = Parser {
            tokens,
            pos: 0,
            options: self,
        };
        let query = parser.parse_query(&self.default_field, 0)?;

        if let Some(token) = parser.peek() {
            return Err(SarissaError::parse(format!("unexpected {token}")));
        }

        Ok(query)
    }

    fn term_query(&self, field: &str, text: &str) -> Result<Option<Box<dyn Query>>> {
        let Some(analyzer) = &self.analyzer else {
            return Ok(Some(Box::new(TermQuery::new(field, text))));
        };

        let mut terms: Vec<Box<dyn Query>> = analyzer
            .analyze(text)?
            .map(|token| Box::new(TermQuery::new(field, token.text)) as Box<dyn Query>)
            .collect();

        Ok(match terms.len() {
            0 => None,
            1 => terms.pop(),
            _ => Some(Box::new(SpanNearQuery::phrase(terms))),
        })
    }

    fn phrase_query(&self, field: &str, text: &str, slop: u32) -> Result<Option<Box<dyn Query>>> {
        let words: Vec<String> = match &self.analyzer {
            Some(analyzer) => analyzer.analyze(text)?.map(|t| t.text).collect(),
            None => text.split_whitespace().map(str::to_string).collect(),
        };

        let mut terms: Vec<Box<dyn Query>> = words
            .into_iter()
            .map(|w| Box::new(TermQuery::new(field, w)) as Box<dyn Query>)
            .collect();

        Ok(match terms.len() {
            0 => None,
            1 => terms.pop(),
            _ => Some(Box::new(SpanNearQuery::new(terms, slop, true))),
        })
    }

    fn word_query(&self, field: &str, raw: &str) -> Result<Option<Box<dyn Query>>> {
        if field == "*" && raw == "*" {
            return Ok(Some(Box::new(MatchAllQuery::new())));
        }

        let wildcards = wildcard_positions(raw);
        if wildcards.is_empty() {
            return self.term_query(field, &unescape(raw));
        }

        // A single trailing `*` is a prefix query.
        if wildcards == [raw.len() - 1] && raw.ends_with('*') && raw.len() > 1 {
            let prefix = unescape(&raw[..raw.len() - 1]);
            return Ok(Some(Box::new(PrefixQuery::new(field, prefix))));
        }

        Ok(Some(Box::new(WildcardQuery::new(field, raw)?)))
    }
}

impl QueryParser for StandardQueryParser {
    fn parse(&self, query: &str, _metadata: &Metadata) -> Result<Box<dyn Query>> {
        self.parse_str(query)
    }
}

/// Byte positions of unescaped `*` and `?` characters.
fn wildcard_positions(raw: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut escaped = false;

    for (i, c) in raw.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '*' | '?' => positions.push(i),
            _ => {}
        }
    }

    positions
}

fn unescape(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    text.push(escaped);
                }
            }
            c => text.push(c),
        }
    }

    text
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Phrase(String),
    Regex(String),
    Plus,
    Minus,
    Not,
    And,
    Or,
    Colon,
    LParen,
    RParen,
    Boost(f32),
    Slop(u32),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Word(w) => write!(f, "term '{w}'"),
            Token::Phrase(p) => write!(f, "phrase \"{p}\""),
            Token::Regex(r) => write!(f, "regexp /{r}/"),
            Token::Plus => f.write_str("'+'"),
            Token::Minus => f.write_str("'-'"),
            Token::Not => f.write_str("NOT"),
            Token::And => f.write_str("AND"),
            Token::Or => f.write_str("OR"),
            Token::Colon => f.write_str("':'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::Boost(b) => write!(f, "'^{b}'"),
            Token::Slop(s) => write!(f, "'~{s}'"),
        }
    }
}

struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Lexer {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        while let Some(&(pos, c)) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
                continue;
            }

            let token = match c {
                '(' => self.single(Token::LParen),
                ')' => self.single(Token::RParen),
                ':' => self.single(Token::Colon),
                '+' => self.single(Token::Plus),
                '-' => self.single(Token::Minus),
                '"' => Token::Phrase(self.delimited('"', pos, "phrase")?),
                '/' => Token::Regex(self.delimited('/', pos, "regexp")?),
                '^' => {
                    self.chars.next();
                    let number = self.number();
                    let boost = number.parse::<f32>().map_err(|_| {
                        SarissaError::parse(format!("invalid boost '{number}' at position {pos}"))
                    })?;
                    Token::Boost(boost)
                }
                '~' => {
                    self.chars.next();
                    let number = self.number();
                    let slop = number.parse::<u32>().map_err(|_| {
                        SarissaError::parse(format!("invalid slop '{number}' at position {pos}"))
                    })?;
                    Token::Slop(slop)
                }
                '&' | '|' => {
                    self.chars.next();
                    match self.chars.next() {
                        Some((_, next)) if next == c => {
                            if c == '&' {
                                Token::And
                            } else {
                                Token::Or
                            }
                        }
                        _ => return Err(unexpected_char(c, pos)),
                    }
                }
                c if is_reserved(c) => return Err(unexpected_char(c, pos)),
                _ => {
                    let word = self.word()?;
                    match word.as_str() {
                        "AND" => Token::And,
                        "OR" => Token::Or,
                        "NOT" => Token::Not,
                        _ => Token::Word(word),
                    }
                }
            };

            tokens.push(token);
        }

        Ok(tokens)
    }

    fn single(&mut self, token: Token) -> Token {
        self.chars.next();
        token
    }

    /// Read up to an unescaped `delimiter`; escapes other than the
    /// delimiter itself are kept for the consumer.
    fn delimited(&mut self, delimiter: char, start: usize, what: &str) -> Result<String> {
        self.chars.next();
        let mut text = String::new();

        while let Some((_, c)) = self.chars.next() {
            match c {
                '\\' => match self.chars.next() {
                    Some((_, next)) if next == delimiter => text.push(next),
                    Some((_, next)) => {
                        text.push('\\');
                        text.push(next);
                    }
                    None => break,
                },
                c if c == delimiter => return Ok(text),
                c => text.push(c),
            }
        }

        Err(SarissaError::parse(format!(
            "unterminated {what} starting at position {start}"
        )))
    }

    fn number(&mut self) -> &'a str {
        let start = self.chars.peek().map_or(self.input.len(), |&(i, _)| i);
        let mut end = start;

        while let Some(&(i, c)) = self.chars.peek() {
            if !(c.is_ascii_digit() || c == '.') {
                break;
            }
            self.chars.next();
            end = i + c.len_utf8();
        }

        &self.input[start..end]
    }

    /// Read a bare word. Escaped characters keep their backslash so that
    /// wildcard detection can tell `\*` from `*`.
    fn word(&mut self) -> Result<String> {
        let mut word = String::new();

        while let Some(&(pos, c)) = self.chars.peek() {
            if c.is_whitespace() || matches!(c, '(' | ')' | ':' | '^' | '~' | '"' | '/') {
                break;
            }
            if is_reserved(c) {
                return Err(unexpected_char(c, pos));
            }

            self.chars.next();
            word.push(c);

            if c == '\\' {
                match self.chars.next() {
                    Some((_, escaped)) => word.push(escaped),
                    None => {
                        return Err(SarissaError::parse("query ends with an escape character"));
                    }
                }
            }
        }

        Ok(word)
    }
}

fn is_reserved(c: char) -> bool {
    matches!(c, '!' | '{' | '}' | '[' | ']')
}

fn unexpected_char(c: char, pos: usize) -> SarissaError {
    SarissaError::parse(format!("unexpected character '{c}' at position {pos}"))
}

/// A clause collected while parsing one boolean level.
struct ParsedClause {
    query: Box<dyn Query>,
    occur: Occur,
    explicit: bool,
}

struct Parser<'p> {
    tokens: Vec<Token>,
    pos: usize,
    options: &'p StandardQueryParser,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse_query(&mut self, field: &str, depth: usize) -> Result<Box<dyn Query>> {
        let mut clauses: Vec<ParsedClause> = Vec::new();

        loop {
            match self.peek() {
                None if depth > 0 => return Err(SarissaError::parse("missing ')'")),
                None => break,
                Some(Token::RParen) if depth == 0 => {
                    return Err(SarissaError::parse("unbalanced ')'"));
                }
                Some(Token::RParen) => break,
                _ => {}
            }

            let conjunction = match self.peek() {
                Some(Token::And) | Some(Token::Or) => {
                    if clauses.is_empty() {
                        return Err(SarissaError::parse(format!(
                            "{} without a preceding clause",
                            self.peek().map_or(String::new(), |t| t.to_string())
                        )));
                    }
                    self.advance()
                }
                _ => None,
            };

            let (mut occur, explicit) = match self.peek() {
                Some(Token::Plus) => {
                    self.advance();
                    (Occur::Must, true)
                }
                Some(Token::Minus) | Some(Token::Not) => {
                    self.advance();
                    (Occur::MustNot, true)
                }
                _ => (self.options.default_occur, false),
            };

            // AND / OR rebind both neighbours unless they carry an operator.
            let joined = match conjunction {
                Some(Token::And) => Some(Occur::Must),
                Some(Token::Or) => Some(Occur::Should),
                _ => None,
            };
            if let Some(joined) = joined {
                if let Some(previous) = clauses.last_mut() {
                    if !previous.explicit {
                        previous.occur = joined;
                    }
                }
                if !explicit {
                    occur = joined;
                }
            }

            if let Some(query) = self.parse_clause(field, depth)? {
                clauses.push(ParsedClause {
                    query,
                    occur,
                    explicit,
                });
            }
        }

        if clauses.is_empty() {
            return Err(SarissaError::parse("empty query"));
        }

        if clauses.len() == 1 && clauses[0].occur == Occur::Should {
            if let Some(clause) = clauses.pop() {
                return Ok(clause.query);
            }
        }

        let mut boolean = BooleanQuery::new();
        for clause in clauses {
            boolean.add_clause(BooleanClause::new(clause.query, clause.occur));
        }
        Ok(Box::new(boolean))
    }

    /// Parse one clause. `None` means the clause analyzed to nothing.
    fn parse_clause(&mut self, field: &str, depth: usize) -> Result<Option<Box<dyn Query>>> {
        let token = self
            .advance()
            .ok_or_else(|| SarissaError::parse("unexpected end of query"))?;

        let mut query = match token {
            Token::Word(word) if self.peek() == Some(&Token::Colon) => {
                self.advance();
                let field = unescape(&word);
                return self.parse_field_clause(&field, depth);
            }
            Token::Word(word) => self.options.word_query(field, &word)?,
            Token::Phrase(text) => {
                let slop = match self.peek() {
                    Some(Token::Slop(slop)) => {
                        let slop = *slop;
                        self.advance();
                        slop
                    }
                    _ => 0,
                };
                self.options.phrase_query(field, &text, slop)?
            }
            Token::Regex(pattern) => {
                Some(Box::new(RegexpQuery::new(field, pattern)?) as Box<dyn Query>)
            }
            Token::LParen => {
                let inner = self.parse_query(field, depth + 1)?;
                self.expect_rparen()?;
                Some(inner)
            }
            other => return Err(SarissaError::parse(format!("unexpected {other}"))),
        };

        self.apply_boost(&mut query);
        Ok(query)
    }

    fn parse_field_clause(&mut self, field: &str, depth: usize) -> Result<Option<Box<dyn Query>>> {
        match self.peek() {
            Some(Token::Word(_)) | Some(Token::Phrase(_)) | Some(Token::Regex(_))
            | Some(Token::LParen) => self.parse_clause(field, depth),
            Some(other) => Err(SarissaError::parse(format!(
                "unexpected {other} after field '{field}'"
            ))),
            None => Err(SarissaError::parse(format!(
                "missing term after field '{field}'"
            ))),
        }
    }

    fn expect_rparen(&mut self) -> Result<()> {
        match self.advance() {
            Some(Token::RParen) => Ok(()),
            Some(other) => Err(SarissaError::parse(format!("expected ')', found {other}"))),
            None => Err(SarissaError::parse("missing ')'")),
        }
    }

    fn apply_boost(&mut self, query: &mut Option<Box<dyn Query>>) {
        if let Some(Token::Boost(boost)) = self.peek() {
            let boost = *boost;
            self.advance();
            if let Some(query) = query {
                query.set_boost(boost);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::StandardAnalyzer;
    use crate::query::disjunction_max::DisjunctionMaxQuery;

    fn parse(text: &str) -> Result<Box<dyn Query>> {
        StandardQueryParser::new("body").parse(text, &Metadata::new())
    }

    #[test]
    fn test_parse_simple_term() {
        let query = parse("hello").unwrap();
        assert_eq!(query.description(), "body:hello");
        assert!(query.as_any().downcast_ref::<TermQuery>().is_some());
    }

    #[test]
    fn test_parse_field_term() {
        let query = parse("title:rust").unwrap();
        assert_eq!(query.description(), "title:rust");
    }

    #[test]
    fn test_parse_boolean_operators() {
        let query = parse("+term1 +term2* -term3").unwrap();
        let boolean = query.as_any().downcast_ref::<BooleanQuery>().unwrap();
        assert_eq!(boolean.clauses().len(), 3);
        assert_eq!(boolean.clauses_by_occur(Occur::Must).len(), 2);
        assert_eq!(boolean.clauses_by_occur(Occur::MustNot).len(), 1);
        assert!(
            boolean.clauses()[1]
                .query
                .as_any()
                .downcast_ref::<PrefixQuery>()
                .is_some()
        );
    }

    #[test]
    fn test_parse_boolean_and() {
        let query = parse("rust AND search").unwrap();
        let boolean = query.as_any().downcast_ref::<BooleanQuery>().unwrap();
        assert_eq!(boolean.clauses_by_occur(Occur::Must).len(), 2);
    }

    #[test]
    fn test_parse_boolean_or() {
        let query = parse("rust OR search").unwrap();
        let boolean = query.as_any().downcast_ref::<BooleanQuery>().unwrap();
        assert!(boolean.is_pure_disjunction());
    }

    #[test]
    fn test_parse_not() {
        let query = parse("rust NOT java").unwrap();
        let boolean = query.as_any().downcast_ref::<BooleanQuery>().unwrap();
        assert_eq!(boolean.clauses_by_occur(Occur::MustNot).len(), 1);
    }

    #[test]
    fn test_parse_nested_groups() {
        let query = parse("+term2* -(+(+term1*))").unwrap();
        assert_eq!(query.description(), "+body:term2* -(+(+body:term1*))");
    }

    #[test]
    fn test_parse_field_group() {
        let query = parse("title:(a b)").unwrap();
        assert_eq!(query.description(), "title:a title:b");
    }

    #[test]
    fn test_parse_phrase_and_slop() {
        let query = parse("\"quick fox\"~2").unwrap();
        let span = query.as_any().downcast_ref::<SpanNearQuery>().unwrap();
        assert_eq!(span.slop(), 2);
        assert!(span.is_in_order());
        assert_eq!(span.clauses().len(), 2);

        let query = parse("\"single\"").unwrap();
        assert!(query.as_any().downcast_ref::<TermQuery>().is_some());
    }

    #[test]
    fn test_parse_wildcard_and_regexp() {
        let query = parse("te?t*").unwrap();
        assert!(query.as_any().downcast_ref::<WildcardQuery>().is_some());

        let query = parse("/he.*/").unwrap();
        let regexp = query.as_any().downcast_ref::<RegexpQuery>().unwrap();
        assert_eq!(regexp.pattern(), "he.*");

        let query = parse("foo\\*").unwrap();
        let term = query.as_any().downcast_ref::<TermQuery>().unwrap();
        assert_eq!(term.term(), "foo*");
    }

    #[test]
    fn test_parse_match_all() {
        let query = parse("*:*").unwrap();
        assert!(query.as_any().downcast_ref::<MatchAllQuery>().is_some());
    }

    #[test]
    fn test_parse_boost() {
        let query = parse("rust^2.5").unwrap();
        assert_eq!(query.boost(), 2.5);
    }

    #[test]
    fn test_parse_errors() {
        for text in ["", "   ", "error!", "(unclosed", "closed)", "\"open", "/open", "AND x", "f:"] {
            let err = parse(text).unwrap_err();
            assert!(err.is_parse_error(), "{text:?} gave {err}");
        }
    }

    #[test]
    fn test_parse_with_analyzer() {
        let parser = StandardQueryParser::new("body")
            .with_analyzer(Arc::new(StandardAnalyzer::new().unwrap()));

        let query = parser.parse_str("Hello").unwrap();
        assert_eq!(query.description(), "body:hello");

        let query = parser.parse_str("wi-fi").unwrap();
        assert!(query.as_any().downcast_ref::<SpanNearQuery>().is_some());
    }

    #[test]
    fn test_closure_parser() {
        let parser = |text: &str, _metadata: &Metadata| -> Result<Box<dyn Query>> {
            let disjuncts: Vec<Box<dyn Query>> = text
                .split_whitespace()
                .map(|t| Box::new(TermQuery::new("f", t)) as Box<dyn Query>)
                .collect();
            Ok(Box::new(DisjunctionMaxQuery::new(disjuncts, 0.0)))
        };

        let query = QueryParser::parse(&parser, "a b", &Metadata::new()).unwrap();
        assert_eq!(query.description(), "(f:a | f:b)");

        let highlight = parser.parse_highlight("a", &Metadata::new()).unwrap();
        assert_eq!(highlight.description(), "(f:a)");
    }
}
