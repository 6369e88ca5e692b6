//! Procedural question generation for the arithmetic subjects.

use rand::Rng;

use crate::model::{Question, SubjectConfig};

/// Produce exactly `count` questions within the operand bounds of `config`.
///
/// Questions are drawn independently, so repeats are possible.
pub fn generate<R: Rng + ?Sized>(
    count: usize,
    config: &SubjectConfig,
    rng: &mut R,
) -> Vec<Question> {
    (0..count).map(|_| generate_one(config, rng)).collect()
}

/// Draw a single question.
pub fn generate_one<R: Rng + ?Sized>(config: &SubjectConfig, rng: &mut R) -> Question {
    let (lhs_min, lhs_max) = config.lhs_bounds();
    let lhs = rng.random_range(lhs_min..=lhs_max);
    let (rhs_min, rhs_max) = config.rhs().bounds_for(lhs);
    let rhs = rng.random_range(rhs_min..=rhs_max);
    Question::new(config.subject(), lhs, rhs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RhsRange, Subject};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn produces_requested_count() {
        let mut rng = StdRng::seed_from_u64(1);
        for subject in Subject::ALL {
            let config = SubjectConfig::for_subject(subject);
            assert_eq!(generate(0, &config, &mut rng).len(), 0);
            assert_eq!(generate(17, &config, &mut rng).len(), 17);
        }
    }

    #[test]
    fn addition_stays_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = SubjectConfig::for_subject(Subject::Addition);
        for q in generate(2_000, &config, &mut rng) {
            let (a, b) = q.operands();
            assert!((1..=10).contains(&a), "a = {a}");
            assert!(b >= 1, "b = {b}");
            assert!(a + b <= 19, "{a} + {b}");
            assert_eq!(q.answer(), a + b);
        }
    }

    #[test]
    fn multiplication_stays_within_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        let config = SubjectConfig::for_subject(Subject::Multiplication);
        for q in generate(2_000, &config, &mut rng) {
            let (a, b) = q.operands();
            assert!((1..=10).contains(&a));
            assert!((1..=10).contains(&b));
            assert_eq!(q.answer(), a * b);
        }
    }

    #[test]
    fn subtraction_never_goes_negative() {
        let mut rng = StdRng::seed_from_u64(13);
        let config = SubjectConfig::for_subject(Subject::Subtraction);
        for q in generate(2_000, &config, &mut rng) {
            let (a, b) = q.operands();
            assert!(a >= b, "{a} - {b}");
            assert!(q.answer() >= 0);
            assert!(q.answer() < config.distractor_range());
        }
    }

    #[test]
    fn honors_custom_fixed_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = SubjectConfig::new(
            Subject::Multiplication,
            2,
            2,
            RhsRange::Fixed { min: 5, max: 5 },
            40,
            4,
        )
        .unwrap();
        let questions = generate(config.question_count(), &config, &mut rng);
        assert_eq!(questions.len(), 4);
        assert!(questions.iter().all(|q| q.prompt() == "2 × 5" && q.answer() == 10));
    }

    #[test]
    fn largest_accepted_product_generates() {
        let mut rng = StdRng::seed_from_u64(11);
        let config = SubjectConfig::new(
            Subject::Multiplication,
            46_000,
            46_340,
            RhsRange::Fixed {
                min: 46_000,
                max: 46_340,
            },
            100,
            50,
        )
        .unwrap();
        for q in generate(config.question_count(), &config, &mut rng) {
            let (a, b) = q.operands();
            assert_eq!(i64::from(q.answer()), i64::from(a) * i64::from(b));
        }
    }
}
