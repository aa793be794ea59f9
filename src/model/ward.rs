// src/model/ward.rs

use serde::{Deserialize, Serialize};
use std::ops::Sub;

/// The two patient streams competing for the same pool of beds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientClass {
    Covid,
    Normal,
}

impl PatientClass {
    pub const ALL: [PatientClass; 2] = [PatientClass::Covid, PatientClass::Normal];
}

/// A value tracked separately for each patient class (beds, inpatients, requests...).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassPair {
    pub covid: f64,
    pub normal: f64,
}

impl ClassPair {
    pub const fn new(covid: f64, normal: f64) -> Self {
        Self { covid, normal }
    }

    pub fn get(&self, class: PatientClass) -> f64 {
        match class {
            PatientClass::Covid => self.covid,
            PatientClass::Normal => self.normal,
        }
    }

    pub fn get_mut(&mut self, class: PatientClass) -> &mut f64 {
        match class {
            PatientClass::Covid => &mut self.covid,
            PatientClass::Normal => &mut self.normal,
        }
    }

    pub fn total(&self) -> f64 {
        self.covid + self.normal
    }
}

impl Sub for ClassPair {
    type Output = ClassPair;

    fn sub(self, rhs: ClassPair) -> ClassPair {
        ClassPair::new(self.covid - rhs.covid, self.normal - rhs.normal)
    }
}

/// Outcome of moving the bed split to a new target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reallocation {
    /// `target - previous` per class. Positive means beds were converted into that class.
    pub added: ClassPair,
    /// Patients forced out because their class shrank below its occupancy.
    pub displaced: ClassPair,
}

/// Occupancy state of the hospital.
///
/// `available` is always `beds - inpatients` and is refreshed after every
/// mutation; it is never set on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct WardState {
    pub beds: ClassPair,
    pub inpatients: ClassPair,
    available: ClassPair,
}

impl WardState {
    /// Splits `total_beds` by `covid_share` and starts every pool at least fully occupied.
    pub fn new(total_beds: f64, covid_share: f64, initial_inpatients: ClassPair) -> Self {
        let beds = ClassPair::new(total_beds * covid_share, total_beds * (1.0 - covid_share));
        let inpatients = ClassPair::new(
            0.0_f64.max(beds.covid).max(initial_inpatients.covid),
            0.0_f64.max(beds.normal).max(initial_inpatients.normal),
        );
        let mut ward = Self {
            beds,
            inpatients,
            available: ClassPair::default(),
        };
        ward.refresh_available();
        ward
    }

    pub fn available(&self) -> ClassPair {
        self.available
    }

    fn refresh_available(&mut self) {
        self.available = self.beds - self.inpatients;
    }

    /// Releases up to `sampled` patients of `class`. Returns how many actually left.
    pub fn discharge(&mut self, class: PatientClass, sampled: f64) -> f64 {
        let discharged = sampled.min(self.inpatients.get(class));
        *self.inpatients.get_mut(class) -= discharged;
        self.refresh_available();
        discharged
    }

    /// Admits `requests` patients of `class`.
    ///
    /// Returns the number of patients turned away. When demand exceeds the
    /// free beds the pool is filled to capacity; otherwise every request is
    /// admitted without checking the pool size.
    pub fn admit(&mut self, class: PatientClass, requests: f64) -> f64 {
        let free = self.available.get(class);
        let denied = if requests > free {
            *self.inpatients.get_mut(class) = self.beds.get(class);
            requests - free
        } else {
            *self.inpatients.get_mut(class) += requests;
            0.0
        };
        self.refresh_available();
        denied
    }

    /// Moves the bed split to `target`.
    ///
    /// Deltas are taken against the split held before the overwrite. A class
    /// that loses more beds than it had free has its occupancy snapped down
    /// to the new capacity.
    pub fn reallocate(&mut self, target: ClassPair) -> Reallocation {
        let previous = self.beds;
        let free_before = self.available;
        let added = target - previous;
        self.beds = target;

        let mut displaced = ClassPair::default();
        for class in PatientClass::ALL {
            let removed = -added.get(class);
            let free = free_before.get(class);
            if free < removed {
                *displaced.get_mut(class) = removed - free;
                *self.inpatients.get_mut(class) = self.beds.get(class);
            }
        }
        self.refresh_available();

        Reallocation { added, displaced }
    }
}
