use rand::Rng;
use std::collections::HashSet;

use crate::error::SelectionError;
use crate::question::{Question, QuestionBank};

/// Default number of questions per session
pub const DEFAULT_COUNT: usize = 20;

/// How a session's questions are picked from the bank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionCriteria {
    pub allowed_domains: HashSet<String>,
    pub max_count: usize,
    pub shuffle: bool,
}

impl SelectionCriteria {
    pub fn new<I, S>(domains: I, max_count: usize, shuffle: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_domains: domains.into_iter().map(Into::into).collect(),
            max_count,
            shuffle,
        }
    }
}

/// Build the ordered question list for a session.
///
/// Questions keep their bank order unless `criteria.shuffle` is set, in which
/// case the filtered list is permuted before truncation.
pub fn select<R: Rng + ?Sized>(
    bank: &QuestionBank,
    criteria: &SelectionCriteria,
    rng: &mut R,
) -> Result<Vec<Question>, SelectionError> {
    if criteria.allowed_domains.is_empty() {
        return Err(SelectionError::InvalidSelection);
    }

    let mut chosen: Vec<Question> = bank
        .questions()
        .iter()
        .filter(|q| criteria.allowed_domains.contains(&q.domain))
        .cloned()
        .collect();

    if chosen.is_empty() {
        return Err(SelectionError::NoQuestionsAvailable);
    }

    if criteria.shuffle {
        fisher_yates(&mut chosen, rng);
    }

    chosen.truncate(criteria.max_count);

    tracing::debug!(
        domains = criteria.allowed_domains.len(),
        selected = chosen.len(),
        shuffle = criteria.shuffle,
        "selected session questions"
    );

    Ok(chosen)
}

/// Option order for one display of a question
pub fn shuffle_options<R: Rng + ?Sized>(question: &Question, rng: &mut R) -> Vec<String> {
    let mut options = question.options.clone();
    fisher_yates(&mut options, rng);
    options
}

/// In-place uniform permutation: walk from the back, swapping each slot with one at or before it.
pub fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn question(domain: &str, text: &str) -> Question {
        Question {
            domain: domain.to_string(),
            question: text.to_string(),
            options: vec!["yes".into(), "no".into(), "maybe".into()],
            correct: "yes".into(),
            explanation: None,
        }
    }

    fn create_test_bank() -> QuestionBank {
        QuestionBank::from_questions(vec![
            question("math", "m1"),
            question("history", "h1"),
            question("math", "m2"),
        ])
        .unwrap()
    }

    fn texts(questions: &[Question]) -> Vec<&str> {
        questions.iter().map(|q| q.question.as_str()).collect()
    }

    #[test]
    fn test_filters_to_allowed_domain_in_bank_order() {
        let bank = create_test_bank();
        let criteria = SelectionCriteria::new(["math"], 10, false);
        let mut rng = StdRng::seed_from_u64(7);

        let selected = select(&bank, &criteria, &mut rng).unwrap();
        assert_eq!(texts(&selected), vec!["m1", "m2"]);
    }

    #[test]
    fn test_empty_domain_set_is_invalid() {
        let bank = create_test_bank();
        let criteria = SelectionCriteria::new(Vec::<String>::new(), 10, false);
        let mut rng = StdRng::seed_from_u64(7);

        assert_matches!(
            select(&bank, &criteria, &mut rng),
            Err(SelectionError::InvalidSelection)
        );
    }

    #[test]
    fn test_unknown_domain_yields_no_questions() {
        let bank = create_test_bank();
        let criteria = SelectionCriteria::new(["art"], 10, true);
        let mut rng = StdRng::seed_from_u64(7);

        assert_matches!(
            select(&bank, &criteria, &mut rng),
            Err(SelectionError::NoQuestionsAvailable)
        );
    }

    #[test]
    fn test_truncates_to_max_count() {
        let bank = create_test_bank();
        let criteria = SelectionCriteria::new(["math", "history"], 2, false);
        let mut rng = StdRng::seed_from_u64(7);

        let selected = select(&bank, &criteria, &mut rng).unwrap();
        assert_eq!(texts(&selected), vec!["m1", "h1"]);
    }

    #[test]
    fn test_zero_count_yields_empty_session() {
        let bank = create_test_bank();
        let criteria = SelectionCriteria::new(["math"], 0, false);
        let mut rng = StdRng::seed_from_u64(7);

        assert!(select(&bank, &criteria, &mut rng).unwrap().is_empty());
    }

    #[test]
    fn test_shuffle_options_keeps_every_option() {
        let q = question("math", "m1");
        let mut rng = StdRng::seed_from_u64(42);

        let mut shown = shuffle_options(&q, &mut rng);
        shown.sort();
        let mut expected = q.options.clone();
        expected.sort();
        assert_eq!(shown, expected);
    }

    #[test]
    fn test_shuffle_reaches_every_position() {
        // each of the 3 options should land first at least once over many draws
        let q = question("math", "m1");
        let mut rng = StdRng::seed_from_u64(1);
        let mut firsts = HashSet::new();
        for _ in 0..200 {
            firsts.insert(shuffle_options(&q, &mut rng)[0].clone());
        }
        assert_eq!(firsts.len(), 3);
    }

    #[test]
    fn test_fisher_yates_handles_tiny_inputs() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut empty: Vec<u8> = vec![];
        fisher_yates(&mut empty, &mut rng);
        assert!(empty.is_empty());

        let mut single = vec![9];
        fisher_yates(&mut single, &mut rng);
        assert_eq!(single, vec![9]);
    }

    fn arb_bank() -> impl Strategy<Value = Vec<(u8, u16)>> {
        prop::collection::vec((0u8..4, any::<u16>()), 1..40)
    }

    fn build_bank(raw: &[(u8, u16)]) -> QuestionBank {
        QuestionBank::from_questions(
            raw.iter()
                .enumerate()
                .map(|(i, (d, n))| question(&format!("d{d}"), &format!("{i}-{n}")))
                .collect(),
        )
        .unwrap()
    }

    proptest! {
        #[test]
        fn prop_selection_respects_domains_and_count(
            raw in arb_bank(),
            allowed in prop::collection::hash_set(0u8..4, 1..4),
            max_count in 0usize..50,
            shuffle in any::<bool>(),
            seed in any::<u64>(),
        ) {
            let bank = build_bank(&raw);
            let criteria = SelectionCriteria::new(allowed.iter().map(|d| format!("d{d}")), max_count, shuffle);
            let filtered: Vec<Question> = bank
                .questions()
                .iter()
                .filter(|q| criteria.allowed_domains.contains(&q.domain))
                .cloned()
                .collect();
            let mut rng = StdRng::seed_from_u64(seed);

            match select(&bank, &criteria, &mut rng) {
                Ok(selected) => {
                    prop_assert_eq!(selected.len(), max_count.min(filtered.len()));
                    prop_assert!(selected.iter().all(|q| criteria.allowed_domains.contains(&q.domain)));
                    if !shuffle {
                        prop_assert_eq!(&selected[..], &filtered[..selected.len()]);
                    }
                }
                Err(e) => {
                    prop_assert_eq!(e, SelectionError::NoQuestionsAvailable);
                    prop_assert!(filtered.is_empty());
                }
            }
        }

        #[test]
        fn prop_shuffle_is_a_permutation(raw in arb_bank(), seed in any::<u64>()) {
            let bank = build_bank(&raw);
            let all: HashSet<String> = bank.domains().into_iter().collect();
            let criteria = SelectionCriteria {
                allowed_domains: all,
                max_count: usize::MAX,
                shuffle: true,
            };
            let mut rng = StdRng::seed_from_u64(seed);

            let mut selected = texts(&select(&bank, &criteria, &mut rng).unwrap())
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>();
            let mut original = texts(bank.questions())
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>();
            selected.sort();
            original.sort();
            prop_assert_eq!(selected, original);
        }
    }
}
