//! End-to-end pipeline tests: real C source through the parser, the
//! segmenter, the symbol eater, and the registry.

use std::collections::HashSet;

use sift_tokenize::{
    AtomToken, Casing, Registry, TokenArena, TokenMeta, TokenType, Tokenizer, TokenizerConfig,
};

fn tokenizer() -> Tokenizer {
    Tokenizer::new(Registry::ephemeral(), TokenizerConfig::default()).expect("C grammar loads")
}

fn tokenize(source: &str) -> TokenArena {
    tokenizer().tokenize(source.as_bytes()).expect("tokenize")
}

fn texts(arena: &TokenArena, source: &str) -> Vec<String> {
    arena
        .tokens()
        .iter()
        .map(|t| String::from_utf8_lossy(t.text(source.as_bytes())).into_owned())
        .collect()
}

fn find<'a>(arena: &'a TokenArena, source: &str, needle: &str) -> &'a AtomToken {
    arena
        .tokens()
        .iter()
        .find(|t| t.text(source.as_bytes()) == needle.as_bytes())
        .unwrap_or_else(|| panic!("no token {needle:?}"))
}

#[test]
fn declaration_eats_its_semicolon() {
    let source = "int x;";
    let arena = tokenize(source);
    assert_eq!(texts(&arena, source), ["int", "x"]);

    // "int" is followed by a space and then "x": nothing to absorb.
    let int = find(&arena, source, "int");
    assert_eq!(int.meta.bits() & TokenMeta::ABSORB_MASK, 0);
    assert_eq!(int.meta.casing(), Casing::Lower);

    let x = find(&arena, source, "x");
    assert!(x.meta.contains(TokenMeta::HAS_SEMI));
    assert!(x.meta.pre_space());
}

#[test]
fn call_parens_are_absorbed_in_order() {
    let source = "func(arg);";
    let arena = tokenize(source);
    assert_eq!(texts(&arena, source), ["func", "arg", ";"]);

    // ")" comes before ";", and only the first absorbable byte wins.
    assert!(find(&arena, source, "func").meta.contains(TokenMeta::HAS_PAREN));
    let arg = find(&arena, source, "arg");
    assert!(arg.meta.contains(TokenMeta::HAS_CLOSE));
    assert!(!arg.meta.contains(TokenMeta::HAS_SEMI));
}

#[test]
fn pointer_star_is_absorbed() {
    let source = "int *p;";
    let arena = tokenize(source);
    assert_eq!(texts(&arena, source), ["int", "p"]);
    assert!(find(&arena, source, "int").meta.contains(TokenMeta::HAS_STAR));
    assert!(find(&arena, source, "p").meta.contains(TokenMeta::HAS_SEMI));
}

#[test]
fn declarator_list_commas_are_absorbed() {
    let source = "int a, b;";
    let arena = tokenize(source);
    assert_eq!(texts(&arena, source), ["int", "a", "b"]);
    assert!(find(&arena, source, "a").meta.contains(TokenMeta::HAS_COMMA));
    assert!(find(&arena, source, "b").meta.contains(TokenMeta::HAS_SEMI));
}

#[test]
fn snake_case_declaration_carries_joiners() {
    let source = "int my_var_name;";
    let arena = tokenize(source);
    assert_eq!(texts(&arena, source), ["int", "my", "var", "name"]);
    assert!(find(&arena, source, "my").meta.has_joiner());
    assert!(find(&arena, source, "var").meta.has_joiner());
    let name = find(&arena, source, "name");
    assert!(!name.meta.has_joiner());
    assert!(name.meta.contains(TokenMeta::HAS_SEMI));
}

#[test]
fn leading_digit_marks_a_numeric_token() {
    let source = "int x = 42;";
    let arena = tokenize(source);
    assert_eq!(texts(&arena, source), ["int", "x", "=", "42"]);
    let answer = find(&arena, source, "42");
    assert_eq!(answer.meta.token_type(), TokenType::Numeric);
    assert!(answer.meta.contains(TokenMeta::HAS_SEMI));
    assert_eq!(
        find(&arena, source, "=").meta.token_type(),
        TokenType::Word
    );
}

#[test]
fn comments_fragment_as_blobs() {
    let source = "int x; // tidy parser\n";
    let arena = tokenize(source);
    let tidy = find(&arena, source, "tidy");
    let parser = find(&arena, source, "parser");
    assert_eq!(tidy.meta.token_type(), TokenType::Fragment);
    assert_eq!(parser.meta.token_type(), TokenType::Fragment);
    // Blob fragments bypass the identifier processor: "parser" is locked,
    // but inside a comment it is a plain string fragment.
    assert_eq!(parser.meta.casing(), Casing::Lower);
}

#[test]
fn define_directives_fragment_entirely_as_blobs() {
    let source = "#define MAXLEN 4096\n";
    let arena = tokenize(source);

    // The whole directive is blob material: the `#` and the whitespace
    // are separators, and every surviving run is a string-class fragment.
    // The macro name never reaches the identifier processor even though
    // the grammar hands it over as an identifier leaf.
    assert_eq!(texts(&arena, source), ["define", "MAXLEN", "4096"]);
    for token in arena.tokens() {
        assert_eq!(token.meta.token_type(), TokenType::Fragment);
    }

    // "define" is locked, but the blob path bypasses the short-circuit;
    // it comes out as a plain fragment like its neighbors.
    let define = find(&arena, source, "define");
    assert_eq!(define.meta.token_type(), TokenType::Fragment);
}

#[test]
fn string_literal_content_fragments_as_blobs() {
    let source = "char *s = \"hello world\";\n";
    let arena = tokenize(source);
    assert_eq!(
        find(&arena, source, "hello").meta.token_type(),
        TokenType::Fragment
    );
    assert_eq!(
        find(&arena, source, "world").meta.token_type(),
        TokenType::Fragment
    );
    // The quotes are separator bytes inside the blob; no token spans one.
    for token in arena.tokens() {
        assert!(!token.text(source.as_bytes()).contains(&b'"'));
    }
}

#[test]
fn newline_sets_pre_break_space_sets_pre_space() {
    let source = "int x;\nint y;\n";
    let arena = tokenize(source);
    let tokens = arena.tokens();
    let ints: Vec<&AtomToken> = tokens
        .iter()
        .filter(|t| t.text(source.as_bytes()) == b"int")
        .collect();
    assert_eq!(ints.len(), 2);
    assert!(!ints[0].meta.pre_space());
    assert!(!ints[0].meta.pre_break());
    assert!(ints[1].meta.pre_break());
    assert!(!ints[1].meta.pre_space());
    assert!(find(&arena, source, "x").meta.pre_space());
}

#[test]
fn empty_source_yields_no_tokens() {
    let arena = tokenize("");
    assert!(arena.is_empty());
}

/// Union of token spans, absorbed punctuation, and whitespace partitions
/// the input; no byte is covered twice. Blob-class leaves are excluded
/// here: separator punctuation inside a blob is dropped by design.
#[test]
fn tokens_absorptions_and_whitespace_partition_the_source() {
    let sources = [
        "int x;\n",
        "void handler(int a, int b);\n",
        "int my_var = 10;\n",
        "func(arg);",
        "struct node *next;\n",
    ];
    for source in sources {
        let arena = tokenize(source);
        let bytes = source.as_bytes();
        let mut covered = vec![false; bytes.len()];

        for token in arena.tokens() {
            for slot in &mut covered[token.offset as usize..token.end() as usize] {
                assert!(!*slot, "overlapping token in {source:?}");
                *slot = true;
            }
            assert!(
                (token.meta.bits() & TokenMeta::ABSORB_MASK).count_ones() <= 1,
                "multiple absorbed symbols in {source:?}"
            );
            if let Some(symbol) = token.meta.absorbed_symbol() {
                // Re-derive the absorbed byte: first non-whitespace after
                // the span.
                let mut at = token.end() as usize;
                while at < bytes.len() && bytes[at].is_ascii_whitespace() {
                    at += 1;
                }
                assert_eq!(bytes[at], symbol, "absorption mismatch in {source:?}");
                assert!(!covered[at], "absorbed byte covered twice in {source:?}");
                covered[at] = true;
            }
        }

        for (offset, &byte) in bytes.iter().enumerate() {
            if !byte.is_ascii_whitespace() {
                assert!(
                    covered[offset],
                    "byte {offset} ({:?}) uncovered in {source:?}",
                    byte as char
                );
            }
        }
    }
}

/// No emitted span contains an underscore or a camel boundary, across a
/// realistic mix of inputs and a warm model.
#[test]
fn boundary_invariants_hold_on_a_warm_model() {
    let mut tokenizer = tokenizer();
    let sources = [
        "int frame_count = 0;\n",
        "void parseHttpRequest(char *requestBuffer);\n",
        "static uint32_t ring_buffer_mask;\n",
        "int contextswitch(void);\n",
    ];
    for source in sources {
        let arena = tokenizer.tokenize(source.as_bytes()).expect("tokenize");
        for token in arena.tokens() {
            if token.meta.token_type() != TokenType::Word {
                continue;
            }
            let text = token.text(source.as_bytes());
            assert!(!text.contains(&b'_'), "underscore in {text:?}");
            for pair in text.windows(2) {
                assert!(
                    !(pair[0].is_ascii_lowercase() && pair[1].is_ascii_uppercase()),
                    "camel boundary inside {text:?} from {source:?}"
                );
            }
        }
    }
}

#[test]
fn registry_log_is_idempotent_across_runs() {
    let dir = tempfile::tempdir().expect("temp dir");
    let vocab = dir.path().join("vocab.bin");
    let source = "int tidy_parser(void);\n";

    let first_ids: HashSet<u32> = {
        let registry = Registry::open(&vocab).expect("open");
        let mut tokenizer =
            Tokenizer::new(registry, TokenizerConfig::default()).expect("tokenizer");
        let arena = tokenizer.tokenize(source.as_bytes()).expect("tokenize");
        arena.tokens().iter().map(|t| t.root_id).collect()
    };
    let size_after_first = std::fs::metadata(&vocab).expect("stat").len();

    {
        let registry = Registry::open(&vocab).expect("reopen");
        assert_eq!(registry.preloaded(), first_ids.len());
        let mut tokenizer =
            Tokenizer::new(registry, TokenizerConfig::default()).expect("tokenizer");
        tokenizer.tokenize(source.as_bytes()).expect("tokenize");
    }
    let size_after_second = std::fs::metadata(&vocab).expect("stat").len();

    // Every id from the second run was already present; nothing appended.
    assert_eq!(size_after_first, size_after_second);
}
