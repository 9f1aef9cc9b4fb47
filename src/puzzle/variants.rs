//! The eight DNA puzzle variants
//!
//! Every variant implements `PuzzleVariant`: it is generated from the wave
//! number and a seeded RNG, describes itself for the UI, and grades an
//! `Answer`. `PuzzleInstance` is the tagged union the gate stores.

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::dna::{self, Base, MutationKind};

/// Length caps for variants whose layout only fits short strands
const BUILD_MAX_LEN: usize = 6;
const CLASSIFY_MAX_LEN: usize = 6;
const DETECT_MAX_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariantKind {
    BasicComplement,
    MissingBase,
    BuildComplement,
    MutationDetection,
    MutationClassification,
    RnaTranscription,
    Stability,
    Adaptation,
}

impl VariantKind {
    pub const ALL: [VariantKind; 8] = [
        VariantKind::BasicComplement,
        VariantKind::MissingBase,
        VariantKind::BuildComplement,
        VariantKind::MutationDetection,
        VariantKind::MutationClassification,
        VariantKind::RnaTranscription,
        VariantKind::Stability,
        VariantKind::Adaptation,
    ];

    /// 1-based variant number
    pub fn number(self) -> u8 {
        Self::ALL.iter().position(|k| *k == self).map_or(1, |i| i as u8 + 1)
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.get(usize::from(n).checked_sub(1)?).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VariantKind::BasicComplement => "basic_complement",
            VariantKind::MissingBase => "missing_base",
            VariantKind::BuildComplement => "build_complement",
            VariantKind::MutationDetection => "mutation_detection",
            VariantKind::MutationClassification => "mutation_classification",
            VariantKind::RnaTranscription => "rna_transcription",
            VariantKind::Stability => "stability",
            VariantKind::Adaptation => "adaptation",
        }
    }
}

/// Wave-weighted variant choice
pub fn select_kind(wave: u32, rng: &mut Pcg32) -> VariantKind {
    let pool: &[u8] = match wave {
        0..=2 => return VariantKind::BasicComplement,
        3..=4 => {
            return if rng.random_bool(0.7) {
                VariantKind::BasicComplement
            } else {
                VariantKind::MissingBase
            };
        }
        5..=6 => &[1, 2, 3],
        7..=10 => &[1, 2, 3, 4, 5],
        11..=15 => &[2, 3, 4, 5, 6, 7],
        _ => &[1, 2, 3, 4, 5, 6, 7, 8],
    };
    pool.choose(rng)
        .and_then(|n| VariantKind::from_number(*n))
        .unwrap_or(VariantKind::BasicComplement)
}

/// A single pick made on the puzzle board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    /// Index into the displayed options
    Option(usize),
    Base(Base),
    /// 0-based strand position
    Position(usize),
    Mutation(MutationKind),
}

/// What the player has entered so far
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub selected: Option<Selection>,
    /// Bases tapped in order (build variant)
    pub built: Vec<Base>,
}

/// How the board takes input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Pick one of `choices`
    Options,
    /// Pick one of the four DNA bases
    Bases,
    /// Pick a strand position
    Positions,
    /// Pick a mutation kind
    Mutations,
    /// Tap bases in order, up to `capacity`
    Build { capacity: usize },
}

/// Display model for the puzzle board
#[derive(Debug, Clone, PartialEq)]
pub struct PuzzleView {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub lines: Vec<String>,
    pub choices: Vec<String>,
    pub input: InputMode,
}

/// Shared contract for the eight variants
pub trait PuzzleVariant {
    fn generate(wave: u32, rng: &mut Pcg32) -> Self
    where
        Self: Sized;

    fn kind(&self) -> VariantKind;

    /// True iff the answer solves the puzzle. Missing input is a wrong answer.
    fn grade(&self, answer: &Answer) -> bool;

    fn view(&self) -> PuzzleView;
}

fn option_letter(i: usize) -> char {
    (b'A' + i as u8) as char
}

fn base_choices() -> Vec<String> {
    Base::DNA.iter().map(|b| b.to_string()).collect()
}

/// Shuffle `options` and return the new index of `correct`
fn shuffle_tracking(options: &mut [Vec<Base>], correct: &[Base], rng: &mut Pcg32) -> usize {
    options.shuffle(rng);
    options.iter().position(|o| o.as_slice() == correct).unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicComplement {
    pub strand: Vec<Base>,
    pub options: Vec<Vec<Base>>,
    pub correct: usize,
}

impl PuzzleVariant for BasicComplement {
    fn generate(wave: u32, rng: &mut Pcg32) -> Self {
        let strand = dna::strand_for_wave(wave, None, rng);
        let answer = dna::complement(&strand);
        let mut options = vec![answer.clone()];
        while options.len() < 3 {
            let wrong = dna::distractor(&answer, &options[1..], rng);
            options.push(wrong);
        }
        let correct = shuffle_tracking(&mut options, &answer, rng);
        Self {
            strand,
            options,
            correct,
        }
    }

    fn kind(&self) -> VariantKind {
        VariantKind::BasicComplement
    }

    fn grade(&self, answer: &Answer) -> bool {
        answer.selected == Some(Selection::Option(self.correct))
    }

    fn view(&self) -> PuzzleView {
        PuzzleView {
            title: "DNA PAIRING",
            subtitle: "Choose the complement!",
            lines: vec!["Strand:".into(), dna::spaced(&self.strand)],
            choices: self
                .options
                .iter()
                .enumerate()
                .map(|(i, o)| format!("{}) {}", option_letter(i), dna::spaced(o)))
                .collect(),
            input: InputMode::Options,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingBase {
    pub strand: Vec<Base>,
    pub complement: Vec<Base>,
    pub missing: usize,
}

impl PuzzleVariant for MissingBase {
    fn generate(wave: u32, rng: &mut Pcg32) -> Self {
        let strand = dna::strand_for_wave(wave, None, rng);
        let complement = dna::complement(&strand);
        let missing = rng.random_range(0..strand.len());
        Self {
            strand,
            complement,
            missing,
        }
    }

    fn kind(&self) -> VariantKind {
        VariantKind::MissingBase
    }

    fn grade(&self, answer: &Answer) -> bool {
        answer.selected == Some(Selection::Base(self.complement[self.missing]))
    }

    fn view(&self) -> PuzzleView {
        let redacted = self
            .complement
            .iter()
            .enumerate()
            .map(|(i, b)| if i == self.missing { "?".to_string() } else { b.to_string() })
            .collect::<Vec<_>>()
            .join(" ");
        PuzzleView {
            title: "MISSING BASE",
            subtitle: "Which base completes it?",
            lines: vec![
                "DNA:".into(),
                dna::spaced(&self.strand),
                "Complement:".into(),
                redacted,
            ],
            choices: base_choices(),
            input: InputMode::Bases,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildComplement {
    pub strand: Vec<Base>,
    pub target: Vec<Base>,
}

impl PuzzleVariant for BuildComplement {
    fn generate(wave: u32, rng: &mut Pcg32) -> Self {
        let strand = dna::strand_for_wave(wave, Some(BUILD_MAX_LEN), rng);
        let target = dna::complement(&strand);
        Self { strand, target }
    }

    fn kind(&self) -> VariantKind {
        VariantKind::BuildComplement
    }

    fn grade(&self, answer: &Answer) -> bool {
        answer.built == self.target
    }

    fn view(&self) -> PuzzleView {
        PuzzleView {
            title: "BUILD COMPLEMENT",
            subtitle: "Tap bases in order!",
            lines: vec![format!("Strand: {}", dna::spaced(&self.strand))],
            choices: base_choices(),
            input: InputMode::Build {
                capacity: self.strand.len(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationDetection {
    pub original: Vec<Base>,
    pub mutated: Vec<Base>,
    pub position: usize,
}

impl PuzzleVariant for MutationDetection {
    fn generate(wave: u32, rng: &mut Pcg32) -> Self {
        let original = dna::strand_for_wave(wave, Some(DETECT_MAX_LEN), rng);
        let (mutated, position) = dna::substitute(&original, rng);
        Self {
            original,
            mutated,
            position,
        }
    }

    fn kind(&self) -> VariantKind {
        VariantKind::MutationDetection
    }

    fn grade(&self, answer: &Answer) -> bool {
        answer.selected == Some(Selection::Position(self.position))
    }

    fn view(&self) -> PuzzleView {
        PuzzleView {
            title: "FIND MUTATION",
            subtitle: "Which base mutated?",
            lines: vec![
                "Original:".into(),
                dna::spaced(&self.original),
                "Mutated:".into(),
                dna::spaced(&self.mutated),
            ],
            choices: (1..=self.original.len()).map(|i| i.to_string()).collect(),
            input: InputMode::Positions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationClassification {
    pub original: Vec<Base>,
    pub mutated: Vec<Base>,
    pub mutation: MutationKind,
}

impl PuzzleVariant for MutationClassification {
    fn generate(wave: u32, rng: &mut Pcg32) -> Self {
        let original = dna::strand_for_wave(wave, Some(CLASSIFY_MAX_LEN), rng);
        let (mutated, mutation) = dna::classified_mutation(&original, rng);
        Self {
            original,
            mutated,
            mutation,
        }
    }

    fn kind(&self) -> VariantKind {
        VariantKind::MutationClassification
    }

    fn grade(&self, answer: &Answer) -> bool {
        answer.selected == Some(Selection::Mutation(self.mutation))
    }

    fn view(&self) -> PuzzleView {
        PuzzleView {
            title: "MUTATION TYPE",
            subtitle: "What mutation occurred?",
            lines: vec![
                format!("Original: {}", dna::spaced(&self.original)),
                format!("Mutated: {}", dna::spaced(&self.mutated)),
            ],
            choices: MutationKind::ALL.iter().map(|m| m.label().to_string()).collect(),
            input: InputMode::Mutations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RnaTranscription {
    pub strand: Vec<Base>,
    pub options: Vec<Vec<Base>>,
    pub correct: usize,
}

impl PuzzleVariant for RnaTranscription {
    fn generate(wave: u32, rng: &mut Pcg32) -> Self {
        let mut strand = dna::strand_for_wave(wave, None, rng);
        // Without an A the RNA and DNA complements are identical
        if !strand.contains(&Base::A) {
            let pos = rng.random_range(0..strand.len());
            strand[pos] = Base::A;
        }
        let answer = dna::rna_complement(&strand);
        let dna_trap = dna::complement(&strand);
        let wrong = dna::distractor(&answer, std::slice::from_ref(&dna_trap), rng);
        let mut options = vec![answer.clone(), dna_trap, wrong];
        let correct = shuffle_tracking(&mut options, &answer, rng);
        Self {
            strand,
            options,
            correct,
        }
    }

    fn kind(&self) -> VariantKind {
        VariantKind::RnaTranscription
    }

    fn grade(&self, answer: &Answer) -> bool {
        answer.selected == Some(Selection::Option(self.correct))
    }

    fn view(&self) -> PuzzleView {
        PuzzleView {
            title: "RNA TRANSCRIPTION",
            subtitle: "RNA uses U not T!",
            lines: vec![format!("DNA: {}", dna::spaced(&self.strand))],
            choices: self.options.iter().map(|o| dna::spaced(o)).collect(),
            input: InputMode::Options,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stability {
    pub strands: [Vec<Base>; 2],
    pub correct: usize,
}

impl PuzzleVariant for Stability {
    fn generate(_wave: u32, rng: &mut Pcg32) -> Self {
        let mut low = dna::parse("ATATAT").unwrap_or_default();
        let mut high = dna::parse("GCGCAG").unwrap_or_default();
        low.shuffle(rng);
        high.shuffle(rng);
        if rng.random_bool(0.5) {
            Self {
                strands: [high, low],
                correct: 0,
            }
        } else {
            Self {
                strands: [low, high],
                correct: 1,
            }
        }
    }

    fn kind(&self) -> VariantKind {
        VariantKind::Stability
    }

    fn grade(&self, answer: &Answer) -> bool {
        answer.selected == Some(Selection::Option(self.correct))
    }

    fn view(&self) -> PuzzleView {
        PuzzleView {
            title: "VIRUS STABILITY",
            subtitle: "G-C bonds are stronger!",
            lines: vec!["Which is MORE stable?".into()],
            choices: self.strands.iter().map(|s| dna::spaced(s)).collect(),
            input: InputMode::Options,
        }
    }
}

pub struct Scenario {
    pub prompt: &'static str,
    /// The first option is the right one
    pub options: [&'static str; 3],
}

pub const SCENARIOS: [Scenario; 5] = [
    Scenario {
        prompt: "Zombies are dying\nfrom headshots",
        options: ["Thicker skull", "Faster legs", "More saliva"],
    },
    Scenario {
        prompt: "Survivors use\nfire attacks",
        options: ["Heat resistance", "Bigger claws", "Better hearing"],
    },
    Scenario {
        prompt: "Zombies can't see\nin darkness",
        options: ["Better smell", "Louder groans", "Softer skin"],
    },
    Scenario {
        prompt: "Humans hide in\ntall buildings",
        options: ["Wall climbing", "Acid spit", "Faster decay"],
    },
    Scenario {
        prompt: "Cold weather is\nkilling zombies",
        options: ["Antifreeze blood", "Bigger teeth", "Glowing eyes"],
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adaptation {
    pub scenario: usize,
    /// Display order as indices into the scenario's options; 0 is correct
    pub order: Vec<usize>,
}

impl PuzzleVariant for Adaptation {
    fn generate(_wave: u32, rng: &mut Pcg32) -> Self {
        let scenario = rng.random_range(0..SCENARIOS.len());
        let mut order = vec![0, 1, 2];
        order.shuffle(rng);
        Self { scenario, order }
    }

    fn kind(&self) -> VariantKind {
        VariantKind::Adaptation
    }

    fn grade(&self, answer: &Answer) -> bool {
        match answer.selected {
            Some(Selection::Option(i)) => self.order.get(i) == Some(&0),
            _ => false,
        }
    }

    fn view(&self) -> PuzzleView {
        let scenario = &SCENARIOS[self.scenario % SCENARIOS.len()];
        PuzzleView {
            title: "VIRUS EVOLUTION",
            subtitle: "Natural selection!",
            lines: vec![scenario.prompt.into(), "Best adaptation?".into()],
            choices: self
                .order
                .iter()
                .map(|&i| scenario.options[i].to_string())
                .collect(),
            input: InputMode::Options,
        }
    }
}

/// A generated puzzle of any variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PuzzleInstance {
    BasicComplement(BasicComplement),
    MissingBase(MissingBase),
    BuildComplement(BuildComplement),
    MutationDetection(MutationDetection),
    MutationClassification(MutationClassification),
    RnaTranscription(RnaTranscription),
    Stability(Stability),
    Adaptation(Adaptation),
}

impl PuzzleInstance {
    pub fn generate(kind: VariantKind, wave: u32, rng: &mut Pcg32) -> Self {
        match kind {
            VariantKind::BasicComplement => Self::BasicComplement(BasicComplement::generate(wave, rng)),
            VariantKind::MissingBase => Self::MissingBase(MissingBase::generate(wave, rng)),
            VariantKind::BuildComplement => Self::BuildComplement(BuildComplement::generate(wave, rng)),
            VariantKind::MutationDetection => {
                Self::MutationDetection(MutationDetection::generate(wave, rng))
            }
            VariantKind::MutationClassification => {
                Self::MutationClassification(MutationClassification::generate(wave, rng))
            }
            VariantKind::RnaTranscription => {
                Self::RnaTranscription(RnaTranscription::generate(wave, rng))
            }
            VariantKind::Stability => Self::Stability(Stability::generate(wave, rng)),
            VariantKind::Adaptation => Self::Adaptation(Adaptation::generate(wave, rng)),
        }
    }

    /// Pick a variant for the wave and generate it
    pub fn for_wave(wave: u32, rng: &mut Pcg32) -> Self {
        let kind = select_kind(wave, rng);
        Self::generate(kind, wave, rng)
    }

    pub fn variant(&self) -> &dyn PuzzleVariant {
        match self {
            Self::BasicComplement(v) => v,
            Self::MissingBase(v) => v,
            Self::BuildComplement(v) => v,
            Self::MutationDetection(v) => v,
            Self::MutationClassification(v) => v,
            Self::RnaTranscription(v) => v,
            Self::Stability(v) => v,
            Self::Adaptation(v) => v,
        }
    }

    pub fn kind(&self) -> VariantKind {
        self.variant().kind()
    }

    pub fn grade(&self, answer: &Answer) -> bool {
        self.variant().grade(answer)
    }

    pub fn view(&self) -> PuzzleView {
        self.variant().view()
    }

    /// Maximum bases the build board accepts, if this is a build puzzle
    pub fn build_capacity(&self) -> Option<usize> {
        match self {
            Self::BuildComplement(v) => Some(v.strand.len()),
            _ => None,
        }
    }

    /// Map a tapped choice index to a selection for this board
    pub fn selection_for(&self, index: usize) -> Option<Selection> {
        let view = self.view();
        if index >= view.choices.len() {
            return None;
        }
        match view.input {
            InputMode::Options => Some(Selection::Option(index)),
            InputMode::Bases => Base::DNA.get(index).copied().map(Selection::Base),
            InputMode::Positions => Some(Selection::Position(index)),
            InputMode::Mutations => MutationKind::ALL.get(index).copied().map(Selection::Mutation),
            InputMode::Build { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn pick(option: usize) -> Answer {
        Answer {
            selected: Some(Selection::Option(option)),
            built: Vec::new(),
        }
    }

    fn select(selection: Selection) -> Answer {
        Answer {
            selected: Some(selection),
            built: Vec::new(),
        }
    }

    #[test]
    fn test_early_waves_only_basic() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..100 {
            assert_eq!(select_kind(1, &mut rng), VariantKind::BasicComplement);
            assert_eq!(select_kind(2, &mut rng), VariantKind::BasicComplement);
        }
    }

    #[test]
    fn test_variant_pools_by_wave() {
        let mut rng = Pcg32::seed_from_u64(4);
        for _ in 0..300 {
            let n = select_kind(4, &mut rng).number();
            assert!(n == 1 || n == 2);
            assert!((1..=3).contains(&select_kind(6, &mut rng).number()));
            assert!((1..=5).contains(&select_kind(9, &mut rng).number()));
            assert!((2..=7).contains(&select_kind(12, &mut rng).number()));
        }
        let seen: std::collections::HashSet<u8> =
            (0..500).map(|_| select_kind(20, &mut rng).number()).collect();
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn test_wave_three_is_mostly_basic() {
        let mut rng = Pcg32::seed_from_u64(5);
        let basic = (0..10_000)
            .filter(|_| select_kind(3, &mut rng) == VariantKind::BasicComplement)
            .count();
        assert!((6700..7300).contains(&basic));
    }

    #[test]
    fn test_no_selection_is_wrong() {
        let mut rng = Pcg32::seed_from_u64(6);
        for kind in VariantKind::ALL {
            let puzzle = PuzzleInstance::generate(kind, 12, &mut rng);
            assert!(!puzzle.grade(&Answer::default()), "{kind:?}");
        }
    }

    #[test]
    fn test_basic_complement_options() {
        let mut rng = Pcg32::seed_from_u64(7);
        let puzzle = BasicComplement::generate(1, &mut rng);
        assert_eq!(puzzle.options.len(), 3);
        assert_eq!(puzzle.options[puzzle.correct], dna::complement(&puzzle.strand));
        assert_ne!(puzzle.options[0], puzzle.options[1]);
        assert_ne!(puzzle.options[1], puzzle.options[2]);
        assert_ne!(puzzle.options[0], puzzle.options[2]);
        assert!(puzzle.grade(&pick(puzzle.correct)));
        assert!(!puzzle.grade(&pick((puzzle.correct + 1) % 3)));
    }

    #[test]
    fn test_missing_base() {
        let mut rng = Pcg32::seed_from_u64(8);
        let puzzle = MissingBase::generate(2, &mut rng);
        let right = puzzle.strand[puzzle.missing].complement();
        assert!(puzzle.grade(&select(Selection::Base(right))));
        let wrong = dna::other_base(right, &mut rng);
        assert!(!puzzle.grade(&select(Selection::Base(wrong))));
        assert!(puzzle.view().lines[3].contains('?'));
    }

    #[test]
    fn test_build_complement_capped() {
        let mut rng = Pcg32::seed_from_u64(9);
        let puzzle = BuildComplement::generate(5, &mut rng);
        assert!(puzzle.strand.len() <= 6);
        let mut answer = Answer::default();
        answer.built = dna::complement(&puzzle.strand);
        assert!(puzzle.grade(&answer));
        answer.built.pop();
        assert!(!puzzle.grade(&answer));
    }

    #[test]
    fn test_mutation_detection() {
        let mut rng = Pcg32::seed_from_u64(10);
        let puzzle = MutationDetection::generate(15, &mut rng);
        assert!(puzzle.original.len() <= 8);
        assert_ne!(puzzle.original[puzzle.position], puzzle.mutated[puzzle.position]);
        assert!(puzzle.grade(&select(Selection::Position(puzzle.position))));
    }

    #[test]
    fn test_mutation_classification() {
        let mut rng = Pcg32::seed_from_u64(11);
        let puzzle = MutationClassification::generate(8, &mut rng);
        assert!(puzzle.original.len() <= 6);
        assert!(puzzle.grade(&select(Selection::Mutation(puzzle.mutation))));
        let other = MutationKind::ALL
            .into_iter()
            .find(|m| *m != puzzle.mutation)
            .unwrap();
        assert!(!puzzle.grade(&select(Selection::Mutation(other))));
    }

    #[test]
    fn test_stability_prefers_gc() {
        let mut rng = Pcg32::seed_from_u64(12);
        for _ in 0..20 {
            let puzzle = Stability::generate(1, &mut rng);
            let best = &puzzle.strands[puzzle.correct];
            let other = &puzzle.strands[1 - puzzle.correct];
            assert!(dna::gc_fraction(best) > dna::gc_fraction(other));
            assert!(puzzle.grade(&pick(puzzle.correct)));
        }
    }

    #[test]
    fn test_adaptation_tracks_origin() {
        let mut rng = Pcg32::seed_from_u64(13);
        let puzzle = Adaptation::generate(16, &mut rng);
        let shown = puzzle.order.iter().position(|&i| i == 0).unwrap();
        assert!(puzzle.grade(&pick(shown)));
        assert!(!puzzle.grade(&pick((shown + 1) % 3)));
        let view = puzzle.view();
        assert_eq!(view.choices[shown], SCENARIOS[puzzle.scenario].options[0]);
    }

    #[test]
    fn test_selection_mapping() {
        let mut rng = Pcg32::seed_from_u64(14);
        let puzzle = PuzzleInstance::generate(VariantKind::MissingBase, 1, &mut rng);
        assert_eq!(puzzle.selection_for(3), Some(Selection::Base(Base::G)));
        assert_eq!(puzzle.selection_for(4), None);
        let build = PuzzleInstance::generate(VariantKind::BuildComplement, 1, &mut rng);
        assert_eq!(build.selection_for(0), None);
        assert_eq!(build.build_capacity(), Some(4));
    }

    proptest! {
        #[test]
        fn prop_rna_options_distinct(seed in any::<u64>(), wave in 1u32..30) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let puzzle = RnaTranscription::generate(wave, &mut rng);
            prop_assert!(puzzle.strand.contains(&Base::A));
            let o = &puzzle.options;
            prop_assert!(o[0] != o[1] && o[1] != o[2] && o[0] != o[2]);
            prop_assert_eq!(&o[puzzle.correct], &dna::rna_complement(&puzzle.strand));
        }

        #[test]
        fn prop_generated_puzzles_are_solvable(seed in any::<u64>(), wave in 1u32..40) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let puzzle = PuzzleInstance::for_wave(wave, &mut rng);
            let solved = (0..puzzle.view().choices.len())
                .filter_map(|i| puzzle.selection_for(i))
                .any(|s| puzzle.grade(&select(s)));
            let built = match &puzzle {
                PuzzleInstance::BuildComplement(b) => puzzle.grade(&Answer {
                    selected: None,
                    built: dna::complement(&b.strand),
                }),
                _ => false,
            };
            prop_assert!(solved || built);
        }
    }
}
