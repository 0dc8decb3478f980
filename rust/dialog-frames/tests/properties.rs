use std::collections::{HashSet, VecDeque};

use dialog_frames::{
    FieldFilter, Frame, FrameRegistry, HypernymSearch, Knowledge, Lexicon, Ontology,
    ResponseMatcher, Sense, SenseEntry, SenseId, WordTokenizer, satisfaction_ratio,
};
use proptest::prelude::*;

/// A random hypernym graph over `size` senses. Edges may point anywhere,
/// so cycles and diamonds both occur.
fn graph() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..24).prop_flat_map(|size| {
        (
            Just(size),
            prop::collection::vec((0..size, 0..size), 0..size * 3),
        )
    })
}

fn lexicon(size: usize, edges: &[(usize, usize)]) -> Lexicon {
    let mut lexicon = Lexicon::new();
    for node in 0..size {
        lexicon.insert(SenseEntry {
            sense: Sense::new(format!("s{node}"), "noun.tops", format!("c{node}")),
            lemmas: vec![format!("w{node}")],
            hypernyms: edges
                .iter()
                .filter(|(from, _)| *from == node)
                .map(|(_, to)| SenseId::new(format!("s{to}")))
                .collect(),
        });
    }
    lexicon
}

fn reachable(size: usize, edges: &[(usize, usize)], from: usize, to: usize) -> bool {
    let mut seen = vec![false; size];
    let mut queue = VecDeque::from([from]);
    while let Some(node) = queue.pop_front() {
        if node == to {
            return true;
        }
        if std::mem::replace(&mut seen[node], true) {
            continue;
        }
        queue.extend(edges.iter().filter(|(f, _)| *f == node).map(|(_, t)| *t));
    }
    false
}

/// Fewest hypernym links from `from` to `to`, if any path exists.
fn distance(size: usize, edges: &[(usize, usize)], from: usize, to: usize) -> Option<usize> {
    let mut depth = vec![None; size];
    depth[from] = Some(0);
    let mut queue = VecDeque::from([from]);
    while let Some(node) = queue.pop_front() {
        let next = depth[node].map(|d| d + 1);
        for &(_, child) in edges.iter().filter(|(f, _)| *f == node) {
            if depth[child].is_none() {
                depth[child] = next;
                queue.push_back(child);
            }
        }
    }
    depth[to]
}

fn frame(fields: usize, bound: usize) -> Frame {
    let mut builder = Frame::builder("f");
    for field in 0..fields {
        builder = builder.field(format!("x{field}"), FieldFilter::any());
    }
    let mut frame = builder.build();
    for field in 0..bound.min(fields) {
        frame.bind(&format!("x{field}"), "v").unwrap();
    }
    frame
}

proptest! {
    #[test]
    fn wildcard_filter_accepts_every_word_and_sense(
        word in "[A-Za-z][A-Za-z0-9']{0,12}",
        category in "(noun|verb|adj)\\.[a-z]{1,8}",
        narrow in "[a-z]{1,10}",
    ) {
        let filter = FieldFilter::any();
        let tagger = Lexicon::new();
        prop_assert!(filter.word_match(&word, &tagger));
        prop_assert!(filter.sense_match(&Sense::new("x.n.01", category, narrow)));
    }

    #[test]
    fn hypernym_search_terminates_and_agrees_with_reachability(
        (size, edges) in graph(),
        target in 0usize..24,
    ) {
        let target = target % size;
        let lexicon = lexicon(size, &edges);
        let start = lexicon.senses("w0").remove(0);
        let filter = FieldFilter::any().semantic([format!("c{target}")]);

        let found = HypernymSearch::new(&lexicon).search(&start, &filter);
        prop_assert_eq!(found, reachable(size, &edges, 0, target));
    }

    #[test]
    fn bounded_hypernym_search_agrees_with_shortest_distance(
        (size, edges) in graph(),
        target in 0usize..24,
        bound in 0usize..6,
    ) {
        let target = target % size;
        let lexicon = lexicon(size, &edges);
        let start = lexicon.senses("w0").remove(0);
        let filter = FieldFilter::any().semantic([format!("c{target}")]);

        let found = HypernymSearch::new(&lexicon)
            .with_max_depth(Some(bound))
            .search(&start, &filter);
        let within = distance(size, &edges, 0, target).is_some_and(|d| d <= bound);
        prop_assert_eq!(found, within);
    }

    #[test]
    fn ratio_is_a_fraction_and_complete_only_when_all_bound(
        shapes in prop::collection::vec((0usize..5, 0usize..6), 0..5),
    ) {
        let frames: Vec<Frame> = shapes.iter().map(|(f, b)| frame(*f, *b)).collect();
        let ratio = satisfaction_ratio(&frames);
        prop_assert!((0.0..=1.0).contains(&ratio));

        let total: usize = frames.iter().map(Frame::field_count).sum();
        let all_bound = frames.iter().all(Frame::is_complete);
        if total == 0 {
            prop_assert_eq!(ratio, 1.0);
        }
        prop_assert_eq!(ratio == 1.0, all_bound);
    }

    #[test]
    fn bindings_are_never_overwritten(values in prop::collection::vec("[a-z]{1,6}", 1..6)) {
        let mut frame = frame(1, 0);
        prop_assert!(frame.bind("x0", values[0].clone()).unwrap());
        for value in &values[1..] {
            prop_assert!(!frame.bind("x0", value.clone()).unwrap());
        }
        prop_assert_eq!(frame.binding("x0"), Some(values[0].as_str()));
    }

    #[test]
    fn merging_keeps_every_existing_binding(
        first in 0usize..5,
        second in 0usize..5,
    ) {
        let mut knowledge: Knowledge = [frame(4, first)].into_iter().collect();
        let before: HashSet<(String, String)> = knowledge
            .get("f")
            .unwrap()
            .bindings()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let mut incoming = Frame::builder("f");
        for field in 0..4 {
            incoming = incoming.field(format!("x{field}"), FieldFilter::any());
        }
        let mut incoming = incoming.build();
        for field in 0..second.min(4) {
            incoming.bind(&format!("x{field}"), "new").unwrap();
        }
        knowledge.merge(incoming);

        let merged = knowledge.get("f").unwrap();
        for (field, value) in &before {
            prop_assert_eq!(merged.binding(field), Some(value.as_str()));
        }
        prop_assert_eq!(merged.bound_count(), first.max(second).min(4));
    }
}

const VOCABULARY: &[&str] = &[
    "i", "have", "a", "cat", "dog", "named", "Rex", "Tom", "cake", "nothing", "my", "is",
];

fn pets() -> (Lexicon, FrameRegistry) {
    let lexicon = Lexicon::new()
        .with_sense("cat.n.01", "noun.animal", &["cat"], &["animal.n.01"])
        .with_sense("dog.n.01", "noun.animal", &["dog"], &["animal.n.01"])
        .with_sense("animal.n.01", "noun.animal", &["animal"], &[])
        .with_sense("cake.n.01", "noun.food", &["cake"], &[]);
    let mut registry = FrameRegistry::new();
    registry
        .register(
            Frame::builder("pet")
                .field("species", FieldFilter::any().lexical("noun.animal").semantic(["animal"]))
                .field("name", FieldFilter::any().pos(["NNP"]))
                .build(),
        )
        .unwrap();
    registry.register(Frame::new("empty")).unwrap();
    (lexicon, registry)
}

fn sentence() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(VOCABULARY), 0..8).prop_map(|words| words.join(" "))
}

proptest! {
    #[test]
    fn zero_field_frames_are_satisfied_by_any_text(text in ".{0,40}") {
        let (lexicon, registry) = pets();
        let matcher = ResponseMatcher::new(&registry, &lexicon, &WordTokenizer, &lexicon);
        let result = matcher.satisfy(&text, &["empty".to_string()], &Knowledge::new()).unwrap();
        prop_assert_eq!(result.ratio, 1.0);
    }

    #[test]
    fn satisfy_is_idempotent_from_the_same_state(text in sentence()) {
        let (lexicon, registry) = pets();
        let matcher = ResponseMatcher::new(&registry, &lexicon, &WordTokenizer, &lexicon);
        let wanted = ["pet".to_string()];
        let first = matcher.satisfy(&text, &wanted, &Knowledge::new()).unwrap();
        let second = matcher.satisfy(&text, &wanted, &Knowledge::new()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn satisfy_never_overwrites_existing_bindings(first in sentence(), second in sentence()) {
        let (lexicon, registry) = pets();
        let matcher = ResponseMatcher::new(&registry, &lexicon, &WordTokenizer, &lexicon);
        let wanted = ["pet".to_string()];

        let earlier = matcher.satisfy(&first, &wanted, &Knowledge::new()).unwrap();
        let local: Knowledge = earlier.frames.values().cloned().collect();
        let later = matcher.satisfy(&second, &wanted, &local).unwrap();

        let before = earlier.frame("pet").unwrap();
        let after = later.frame("pet").unwrap();
        for (field, value) in before.bindings() {
            prop_assert_eq!(after.binding(field), Some(value));
        }
        prop_assert!(later.ratio >= earlier.ratio);
    }
}
