//! Random record generation
//!
//! Produces records that satisfy a rule set, for seeding a store through
//! `import`.

use chrono::{Duration, Local, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::record::{Record, RecordId, RecordParameters, Salary};
use crate::validation::ValidationRules;

const FIRST_NAMES: &[&str] = &[
    "Anna", "Boris", "Clara", "Dmitri", "Elena", "Felix", "Greta", "Hugo", "Ivana", "Jonas",
    "Katya", "Leo", "Marta", "Nils", "Olga", "Pavel", "Rosa", "Stefan", "Tanja", "Viktor",
];

const LAST_NAMES: &[&str] = &[
    "Andersen", "Berg", "Castillo", "Dvorak", "Eriksen", "Fischer", "Gallo", "Horvat", "Ivanova",
    "Jansen", "Kowalski", "Larsen", "Moreau", "Novak", "Olsen", "Petrov", "Quinn", "Rossi",
];

/// Draws random records within the bounds of a rule set.
pub struct RecordGenerator<R> {
    rng: R,
    rules: ValidationRules,
}

impl<R: Rng> RecordGenerator<R> {
    pub fn new(rng: R, rules: ValidationRules) -> Self {
        Self { rng, rules }
    }

    pub fn parameters(&mut self) -> RecordParameters {
        let first_name = self.name(FIRST_NAMES, self.rules.first_name.min, self.rules.first_name.max);
        let last_name = self.name(LAST_NAMES, self.rules.last_name.min, self.rules.last_name.max);

        let from = self.rules.date_of_birth.from;
        let to = self
            .rules
            .date_of_birth
            .to
            .unwrap_or_else(|| Local::now().date_naive());
        let date_of_birth = self.date_between(from, to);

        let height = self
            .rng
            .gen_range(self.rules.height.min..=self.rules.height.max);
        let salary = Salary::from_cents(
            self.rng
                .gen_range(self.rules.salary.min.cents()..=self.rules.salary.max.cents()),
        );
        let sex = self.rules.sex.choose(&mut self.rng).copied().unwrap_or('M');

        RecordParameters::new(first_name, last_name, date_of_birth, height, salary, sex)
    }

    /// `count` records with consecutive ids starting at `start_id`.
    pub fn records(&mut self, start_id: RecordId, count: usize) -> Vec<Record> {
        (0..count)
            .map(|offset| {
                let span = RecordId::try_from(offset).unwrap_or(RecordId::MAX);
                let id = start_id.saturating_add(span);
                Record::new(id, self.parameters())
            })
            .collect()
    }

    /// Picks a stock name and pads or cuts it to fit `min..=max` chars.
    fn name(&mut self, pool: &[&str], min: usize, max: usize) -> String {
        let mut name: String = pool.choose(&mut self.rng).copied().unwrap_or("Alex").to_string();
        while name.chars().count() < min {
            name.push(self.rng.gen_range(b'a'..=b'z') as char);
        }
        if name.chars().count() > max {
            name = name.chars().take(max.max(1)).collect();
        }
        name
    }

    fn date_between(&mut self, from: NaiveDate, to: NaiveDate) -> NaiveDate {
        let span = (to - from).num_days();
        if span <= 0 {
            return from;
        }
        from + Duration::days(self.rng.gen_range(0..=span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{RecordValidator, ValidationPipeline};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generated_records_pass_default_rules() {
        let rules = ValidationRules::default_rules();
        let pipeline = ValidationPipeline::from_rules(&rules);
        let mut generator = RecordGenerator::new(StdRng::seed_from_u64(7), rules);

        for record in generator.records(1, 200) {
            pipeline.validate(&record.parameters()).unwrap();
        }
    }

    #[test]
    fn test_generated_records_pass_custom_rules() {
        let rules = ValidationRules::custom_rules();
        let pipeline = ValidationPipeline::from_rules(&rules);
        let mut generator = RecordGenerator::new(StdRng::seed_from_u64(11), rules);

        for record in generator.records(1, 200) {
            pipeline.validate(&record.parameters()).unwrap();
        }
    }

    #[test]
    fn test_ids_are_consecutive() {
        let mut generator =
            RecordGenerator::new(StdRng::seed_from_u64(1), ValidationRules::default_rules());
        let ids: Vec<RecordId> = generator.records(40, 3).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![40, 41, 42]);
    }

    #[test]
    fn test_short_names_are_padded() {
        let mut rules = ValidationRules::default_rules();
        rules.first_name.min = 12;
        rules.first_name.max = 14;
        let mut generator = RecordGenerator::new(StdRng::seed_from_u64(3), rules);

        let len = generator.parameters().first_name.chars().count();
        assert!((12..=14).contains(&len));
    }
}
