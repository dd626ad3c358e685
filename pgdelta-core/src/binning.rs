//! Fixed-width interval binning for column profiling.
//!
//! A [`BinSpec`] covers `[lower, upper]` with fixed-width categories.
//! Interior categories are half-open (`[lo, hi)`: a value sitting on an
//! interior upper bound belongs to the next category), while the final
//! category is closed so the outer upper bound itself is counted. The
//! generated SQL enforces the same rule with
//! `not (c.upper < o.upper and v = c.upper)`.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use crate::error::{DeltaError, Result};

/// One fixed-width interval of a histogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Category {
    pub lower: f64,
    pub upper: f64,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.lower, self.upper)
    }
}

/// Outer bounds plus a fixed width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinSpec {
    lower: f64,
    upper: f64,
    width: f64,
}

impl BinSpec {
    pub fn new(lower: f64, upper: f64, width: f64) -> Result<Self> {
        if !lower.is_finite() || !upper.is_finite() || !width.is_finite() {
            return Err(DeltaError::invalid_bin_spec("bounds and width must be finite"));
        }
        if width <= 0.0 {
            return Err(DeltaError::invalid_bin_spec(format!(
                "width must be positive, got {width}"
            )));
        }
        if lower >= upper {
            return Err(DeltaError::invalid_bin_spec(format!(
                "lower bound {lower} must be below upper bound {upper}"
            )));
        }
        Ok(Self {
            lower,
            upper,
            width,
        })
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// The ordered categories covering `[lower, upper]`. The last one is
    /// clamped to the outer upper bound when the width does not divide
    /// the range evenly.
    pub fn categories(&self) -> Vec<Category> {
        let mut categories = Vec::new();
        let mut index = 0u64;
        loop {
            let lower = self.lower + (index as f64) * self.width;
            if lower >= self.upper {
                break;
            }
            categories.push(Category {
                lower,
                upper: (lower + self.width).min(self.upper),
            });
            index += 1;
        }
        categories
    }

    /// The bin index for a value, or None when it falls outside the
    /// outer bounds. Interior upper bounds are exclusive; the outer
    /// upper bound is inclusive and lands in the last bin.
    pub fn category_of(&self, value: f64) -> Option<usize> {
        if !value.is_finite() || value < self.lower || value > self.upper {
            return None;
        }
        let count = self.categories().len();
        if value == self.upper {
            return Some(count - 1);
        }
        let index = ((value - self.lower) / self.width).floor() as usize;
        Some(index.min(count - 1))
    }

    /// Histogram counting distinct keys per bin. Values outside the
    /// outer bounds are ignored.
    pub fn count_distinct<K, I>(&self, values: I) -> Vec<u64>
    where
        K: Hash + Eq,
        I: IntoIterator<Item = (f64, K)>,
    {
        let mut seen: Vec<HashSet<K>> = (0..self.categories().len())
            .map(|_| HashSet::new())
            .collect();
        for (value, key) in values {
            if let Some(index) = self.category_of(value) {
                seen[index].insert(key);
            }
        }
        seen.into_iter().map(|keys| keys.len() as u64).collect()
    }

    /// The textual SQL form of the diagnostic aggregation: distinct
    /// `key_column` values per category of `value_column`.
    ///
    /// Identifiers are spliced verbatim; callers quote them.
    pub fn to_sql(&self, table: &str, value_column: &str, key_column: &str) -> String {
        let values: Vec<String> = self
            .categories()
            .iter()
            .map(|c| format!("        ({}, {})", c.lower, c.upper))
            .collect();

        format!(
            "with outerbounds as (\n\
             \x20   select {outer_upper} as upper\n\
             ), categories (lower, upper) as (\n\
             \x20   values\n{values}\n\
             )\n\
             select c.lower::float8 as lower,\n\
             \x20      c.upper::float8 as upper,\n\
             \x20      count(distinct t.{key}) as distinct_keys\n\
             from categories c\n\
             cross join outerbounds o\n\
             join {table} t\n\
             \x20 on t.{value} >= c.lower\n\
             \x20and t.{value} <= c.upper\n\
             \x20and not (c.upper < o.upper and t.{value} = c.upper)\n\
             group by c.lower, c.upper\n\
             order by c.lower",
            outer_upper = self.upper,
            values = values.join(",\n"),
            key = key_column,
            table = table,
            value = value_column,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(lower: f64, upper: f64, width: f64) -> BinSpec {
        BinSpec::new(lower, upper, width).expect("valid spec")
    }

    #[test]
    fn test_rejects_bad_specs() {
        assert!(BinSpec::new(0.0, 100.0, 0.0).is_err());
        assert!(BinSpec::new(0.0, 100.0, -5.0).is_err());
        assert!(BinSpec::new(100.0, 0.0, 10.0).is_err());
        assert!(BinSpec::new(0.0, f64::INFINITY, 10.0).is_err());
    }

    #[test]
    fn test_categories_even_split() {
        let categories = spec(0.0, 100.0, 10.0).categories();
        assert_eq!(categories.len(), 10);
        assert_eq!(categories[0], Category { lower: 0.0, upper: 10.0 });
        assert_eq!(
            categories[9],
            Category {
                lower: 90.0,
                upper: 100.0
            }
        );
    }

    #[test]
    fn test_last_category_clamped() {
        let categories = spec(0.0, 95.0, 10.0).categories();
        assert_eq!(categories.len(), 10);
        assert_eq!(
            categories[9],
            Category {
                lower: 90.0,
                upper: 95.0
            }
        );
    }

    #[test]
    fn test_wide_width_yields_single_category() {
        let categories = spec(10.0, 20.0, 50.0).categories();
        assert_eq!(
            categories,
            vec![Category {
                lower: 10.0,
                upper: 20.0
            }]
        );
    }

    #[test]
    fn test_interior_upper_bound_belongs_to_next_bin() {
        let spec = spec(0.0, 100.0, 10.0);
        assert_eq!(spec.category_of(0.0), Some(0));
        assert_eq!(spec.category_of(9.999), Some(0));
        // 10 sits on the boundary between bin 0 and bin 1.
        assert_eq!(spec.category_of(10.0), Some(1));
        assert_eq!(spec.category_of(99.0), Some(9));
    }

    #[test]
    fn test_outer_upper_bound_is_inclusive() {
        let spec = spec(0.0, 100.0, 10.0);
        assert_eq!(spec.category_of(100.0), Some(9));
        assert_eq!(spec.category_of(100.001), None);
        assert_eq!(spec.category_of(-0.001), None);
    }

    #[test]
    fn test_count_distinct_dedupes_keys_per_bin() {
        let spec = spec(0.0, 30.0, 10.0);
        let samples = vec![
            (1.0, "a"),
            (2.0, "a"), // same key, same bin: counted once
            (5.0, "b"),
            (15.0, "a"), // same key, other bin: counted again there
            (30.0, "c"), // outer upper bound lands in the last bin
            (99.0, "d"), // out of bounds: ignored
        ];
        assert_eq!(spec.count_distinct(samples), vec![2, 1, 1]);
    }

    #[test]
    fn test_to_sql_carries_boundary_predicate() {
        let sql = spec(0.0, 20.0, 10.0).to_sql("\"public\".\"ages\"", "age", "analysis_id");
        assert!(sql.contains("(0, 10)"));
        assert!(sql.contains("(10, 20)"));
        assert!(sql.contains("not (c.upper < o.upper and t.age = c.upper)"));
        assert!(sql.contains("count(distinct t.analysis_id)"));
        assert!(sql.contains("join \"public\".\"ages\" t"));
    }
}
