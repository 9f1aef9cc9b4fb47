//! Nucleotide bases, strands and the pairing rules
//!
//! DNA pairs A-T and C-G. Transcribing to RNA pairs A-U, T-A, C-G and G-C.

use std::fmt;

use rand::Rng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Base {
    A,
    T,
    C,
    G,
    /// Uracil, only produced by RNA transcription
    U,
}

impl Base {
    /// The DNA alphabet, in button order
    pub const DNA: [Base; 4] = [Base::A, Base::T, Base::C, Base::G];

    /// DNA pairing partner
    pub fn complement(self) -> Base {
        match self {
            Base::A | Base::U => Base::T,
            Base::T => Base::A,
            Base::C => Base::G,
            Base::G => Base::C,
        }
    }

    /// RNA pairing partner for a DNA template base
    pub fn rna_complement(self) -> Base {
        match self {
            Base::A => Base::U,
            Base::T | Base::U => Base::A,
            Base::C => Base::G,
            Base::G => Base::C,
        }
    }

    pub fn is_gc(self) -> bool {
        matches!(self, Base::G | Base::C)
    }

    pub fn as_char(self) -> char {
        match self {
            Base::A => 'A',
            Base::T => 'T',
            Base::C => 'C',
            Base::G => 'G',
            Base::U => 'U',
        }
    }

    pub fn from_char(c: char) -> Option<Base> {
        match c.to_ascii_uppercase() {
            'A' => Some(Base::A),
            'T' => Some(Base::T),
            'C' => Some(Base::C),
            'G' => Some(Base::G),
            'U' => Some(Base::U),
            _ => None,
        }
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Space-separated display form, e.g. "A T G C"
pub fn spaced(strand: &[Base]) -> String {
    strand
        .iter()
        .map(|b| b.as_char().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse "ATGC" (whitespace ignored)
pub fn parse(text: &str) -> Option<Vec<Base>> {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .map(Base::from_char)
        .collect()
}

pub fn complement(strand: &[Base]) -> Vec<Base> {
    strand.iter().map(|b| b.complement()).collect()
}

pub fn rna_complement(strand: &[Base]) -> Vec<Base> {
    strand.iter().map(|b| b.rna_complement()).collect()
}

/// Fraction of G and C bases
pub fn gc_fraction(strand: &[Base]) -> f32 {
    if strand.is_empty() {
        return 0.0;
    }
    strand.iter().filter(|b| b.is_gc()).count() as f32 / strand.len() as f32
}

/// Strand length for a wave: 10 on every fifth wave, 5-6 for waves 6-10,
/// 7-8 for waves 11-20, 4 otherwise
pub fn sequence_length(wave: u32, rng: &mut Pcg32) -> usize {
    if wave % 5 == 0 {
        10
    } else if (6..=10).contains(&wave) {
        if rng.random_bool(0.5) { 5 } else { 6 }
    } else if (11..=20).contains(&wave) {
        if rng.random_bool(0.5) { 7 } else { 8 }
    } else {
        4
    }
}

pub fn random_base(rng: &mut Pcg32) -> Base {
    Base::DNA[rng.random_range(0..Base::DNA.len())]
}

/// A DNA base other than `not`
pub fn other_base(not: Base, rng: &mut Pcg32) -> Base {
    let choices: Vec<Base> = Base::DNA.into_iter().filter(|b| *b != not).collect();
    choices.choose(rng).copied().unwrap_or(Base::A)
}

pub fn random_strand(len: usize, rng: &mut Pcg32) -> Vec<Base> {
    (0..len).map(|_| random_base(rng)).collect()
}

/// Random template strand for a wave, optionally capped in length
pub fn strand_for_wave(wave: u32, cap: Option<usize>, rng: &mut Pcg32) -> Vec<Base> {
    let len = sequence_length(wave, rng);
    let len = cap.map_or(len, |cap| len.min(cap));
    random_strand(len, rng)
}

/// How a strand was altered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationKind {
    Substitution,
    Insertion,
    Deletion,
}

impl MutationKind {
    pub const ALL: [MutationKind; 3] = [
        MutationKind::Substitution,
        MutationKind::Insertion,
        MutationKind::Deletion,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MutationKind::Substitution => "SUBSTITUTION",
            MutationKind::Insertion => "INSERTION",
            MutationKind::Deletion => "DELETION",
        }
    }
}

/// Replace one base with a different one; returns the new strand and the position
pub fn substitute(strand: &[Base], rng: &mut Pcg32) -> (Vec<Base>, usize) {
    let mut out = strand.to_vec();
    let pos = rng.random_range(0..out.len());
    out[pos] = other_base(out[pos], rng);
    (out, pos)
}

pub fn insert(strand: &[Base], rng: &mut Pcg32) -> Vec<Base> {
    let mut out = strand.to_vec();
    let pos = rng.random_range(0..out.len());
    out.insert(pos, random_base(rng));
    out
}

pub fn delete(strand: &[Base], rng: &mut Pcg32) -> Vec<Base> {
    let mut out = strand.to_vec();
    let pos = rng.random_range(0..out.len());
    out.remove(pos);
    out
}

/// Apply a random mutation picked 40/30/30 across substitution, insertion, deletion
pub fn classified_mutation(strand: &[Base], rng: &mut Pcg32) -> (Vec<Base>, MutationKind) {
    let roll: f32 = rng.random();
    if roll < 0.4 {
        (substitute(strand, rng).0, MutationKind::Substitution)
    } else if roll < 0.7 {
        (insert(strand, rng), MutationKind::Insertion)
    } else {
        (delete(strand, rng), MutationKind::Deletion)
    }
}

/// One plausible-looking wrong answer: swap a base for another, swap two
/// neighbours, replace with a random base, or copy the previous base.
/// May return the input unchanged; callers de-duplicate.
fn near_miss(correct: &[Base], rng: &mut Pcg32) -> Vec<Base> {
    let mut wrong = correct.to_vec();
    if wrong.is_empty() {
        return wrong;
    }
    let pos = rng.random_range(0..wrong.len());
    match rng.random_range(0..4) {
        0 => wrong[pos] = other_base(wrong[pos], rng),
        1 => {
            if pos + 1 < wrong.len() {
                wrong.swap(pos, pos + 1);
            }
        }
        2 => wrong[pos] = random_base(rng),
        _ => {
            if pos > 0 {
                wrong[pos] = wrong[pos - 1];
            }
        }
    }
    wrong
}

/// A distractor that differs from `correct` and from everything in `taken`
pub fn distractor(correct: &[Base], taken: &[Vec<Base>], rng: &mut Pcg32) -> Vec<Base> {
    let is_new = |s: &Vec<Base>| s.as_slice() != correct && !taken.contains(s);
    for _ in 0..32 {
        let wrong = near_miss(correct, rng);
        if is_new(&wrong) {
            return wrong;
        }
    }
    // Exhaustive single-base substitutions always yield something new for len >= 2
    for pos in 0..correct.len() {
        for base in Base::DNA {
            let mut wrong = correct.to_vec();
            wrong[pos] = base;
            if is_new(&wrong) {
                return wrong;
            }
        }
    }
    correct.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn strand() -> impl Strategy<Value = Vec<Base>> {
        prop::collection::vec(prop::sample::select(Base::DNA.to_vec()), 1..12)
    }

    #[test]
    fn test_pairing_rules() {
        let s = parse("ATCG").unwrap();
        assert_eq!(spaced(&complement(&s)), "T A G C");
        assert_eq!(spaced(&rna_complement(&s)), "U A G C");
    }

    #[test]
    fn test_sequence_length_schedule() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(sequence_length(1, &mut rng), 4);
        assert_eq!(sequence_length(4, &mut rng), 4);
        assert_eq!(sequence_length(5, &mut rng), 10);
        assert_eq!(sequence_length(10, &mut rng), 10);
        assert_eq!(sequence_length(15, &mut rng), 10);
        assert_eq!(sequence_length(25, &mut rng), 10);
        assert_eq!(sequence_length(21, &mut rng), 4);
        for _ in 0..50 {
            assert!((5..=6).contains(&sequence_length(7, &mut rng)));
            assert!((7..=8).contains(&sequence_length(13, &mut rng)));
        }
    }

    #[test]
    fn test_gc_fraction() {
        assert_eq!(gc_fraction(&parse("ATAT").unwrap()), 0.0);
        assert_eq!(gc_fraction(&parse("GCGA").unwrap()), 0.75);
    }

    #[test]
    fn test_classified_mutation_changes_length_accordingly() {
        let mut rng = Pcg32::seed_from_u64(8);
        let original = random_strand(6, &mut rng);
        for _ in 0..100 {
            let (mutated, kind) = classified_mutation(&original, &mut rng);
            match kind {
                MutationKind::Substitution => {
                    assert_eq!(mutated.len(), 6);
                    assert_ne!(mutated, original);
                }
                MutationKind::Insertion => assert_eq!(mutated.len(), 7),
                MutationKind::Deletion => assert_eq!(mutated.len(), 5),
            }
        }
    }

    proptest! {
        #[test]
        fn prop_dna_complement_round_trips(s in strand()) {
            prop_assert_eq!(complement(&complement(&s)), s);
        }

        #[test]
        fn prop_complement_never_fixes_a_base(s in strand()) {
            // No DNA base pairs with itself, so only the empty strand is self-complementary
            prop_assert_ne!(complement(&s), s);
        }

        #[test]
        fn prop_distractors_are_distinct(seed in any::<u64>(), s in prop::collection::vec(prop::sample::select(Base::DNA.to_vec()), 4..10)) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let first = distractor(&s, &[], &mut rng);
            let second = distractor(&s, std::slice::from_ref(&first), &mut rng);
            prop_assert_ne!(&first, &s);
            prop_assert_ne!(&second, &s);
            prop_assert_ne!(&first, &second);
        }

        #[test]
        fn prop_substitution_changes_exactly_one(seed in any::<u64>(), s in strand()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let (mutated, pos) = substitute(&s, &mut rng);
            let diffs: Vec<usize> = (0..s.len()).filter(|&i| s[i] != mutated[i]).collect();
            prop_assert_eq!(diffs, vec![pos]);
        }
    }
}
