/// A contiguous half-open interval `[start, start + count)` of primary rows
/// belonging to one country.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountryRange {
    pub name: &'static str,
    pub start: usize,
    pub count: usize,
}

impl CountryRange {
    pub const fn new(name: &'static str, start: usize, count: usize) -> Self {
        Self { name, start, count }
    }

    pub fn end(&self) -> usize {
        self.start + self.count
    }

    #[inline(always)]
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end()
    }
}

/// Row ranges of the bundled primary table, in selector order
pub const COUNTRY_RANGES: [CountryRange; 8] = [
    CountryRange::new("Somalia", 0, 199),
    CountryRange::new("Ethiopia", 199, 1141),
    CountryRange::new("Burundi", 1340, 46),
    CountryRange::new("South Sudan", 1386, 81),
    CountryRange::new("Uganda", 1467, 318),
    CountryRange::new("Rwanda", 1785, 30),
    CountryRange::new("Kenya", 1815, 640),
    CountryRange::new("Sudan", 2455, 361),
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("{first} and {second} overlap")]
    Overlap {
        first: &'static str,
        second: &'static str,
    },

    #[error("no country covers row {0}")]
    Gap(usize),

    #[error("country ranges cover {covered} rows but the primary table has {rows}")]
    Total { covered: usize, rows: usize },
}

/// Check that `ranges` are pairwise disjoint and that their union is exactly
/// `[0, rows)`.
pub fn validate_ranges(ranges: &[CountryRange], rows: usize) -> Result<(), RangeError> {
    let mut sorted: Vec<&CountryRange> = ranges.iter().filter(|r| r.count > 0).collect();
    sorted.sort_by_key(|r| r.start);

    let mut cursor = 0;
    for pair in sorted.windows(2) {
        if pair[0].end() > pair[1].start {
            return Err(RangeError::Overlap {
                first: pair[0].name,
                second: pair[1].name,
            });
        }
    }
    for range in &sorted {
        if range.start > cursor {
            return Err(RangeError::Gap(cursor));
        }
        cursor = range.end();
    }

    if cursor != rows {
        return Err(RangeError::Total {
            covered: cursor,
            rows,
        });
    }
    Ok(())
}
