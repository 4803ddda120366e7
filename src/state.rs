use crate::data::CountryRange;
use crate::dataset::DatasetType;

/// Country selector value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CountryFilter {
    #[default]
    All,
    /// Index into the configured country ranges
    Country(usize),
}

impl CountryFilter {
    /// `All` -> first country -> ... -> last country -> `All`
    pub fn next(self, countries: usize) -> Self {
        match self {
            CountryFilter::All if countries > 0 => CountryFilter::Country(0),
            CountryFilter::Country(i) if i + 1 < countries => CountryFilter::Country(i + 1),
            _ => CountryFilter::All,
        }
    }

    pub fn name(self, countries: &[CountryRange]) -> &'static str {
        match self {
            CountryFilter::All => "All countries",
            CountryFilter::Country(i) => countries.get(i).map_or("Unknown", |c| c.name),
        }
    }
}

/// How a visual update is applied
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Paint {
    Immediate,
    Eased,
}

/// Renderer work requested by a state transition
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Effects {
    pub recolor: Option<Paint>,
    pub legend: bool,
    pub rebuild_series: bool,
    pub hide_series: bool,
    pub marker: Option<Paint>,
    /// Defer recolor and marker to the trailing edge of a slider burst
    pub debounce: bool,
}

impl Effects {
    pub fn none() -> Self {
        Self::default()
    }

    /// Work for a time-index change that is applied right away
    pub fn time_changed(paint: Paint) -> Self {
        Self {
            recolor: Some(paint),
            marker: Some(paint),
            ..Self::default()
        }
    }
}

/// UI inputs that mutate the selection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    SetDataset(DatasetType),
    SetCountry(CountryFilter),
    /// Manual slider input
    SetTime(usize),
    TogglePlay,
    /// Animation timer tick
    Advance,
    SelectUnit(usize),
    ClosePanel,
}

/// The single mutable session state read by every renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub dataset: DatasetType,
    pub country: CountryFilter,
    pub time_index: usize,
    pub selected: Option<usize>,
    pub animating: bool,
}

impl Selection {
    /// Transitions never start an eased update while the animation runs
    pub fn paint(&self) -> Paint {
        if self.animating {
            Paint::Immediate
        } else {
            Paint::Eased
        }
    }

    /// Apply one action and report which renderers must run.
    ///
    /// `periods` is the timeline length; time indices wrap and clamp within it.
    pub fn apply(&mut self, action: Action, periods: usize) -> Effects {
        let last = periods.saturating_sub(1);
        match action {
            Action::SetDataset(dataset) => {
                self.dataset = dataset;
                Effects {
                    recolor: Some(self.paint()),
                    legend: true,
                    rebuild_series: self.selected.is_some(),
                    ..Effects::none()
                }
            }
            Action::SetCountry(country) => {
                self.country = country;
                Effects {
                    recolor: Some(self.paint()),
                    legend: true,
                    ..Effects::none()
                }
            }
            Action::SetTime(index) => {
                // Dragging the slider during playback pauses it
                self.animating = false;
                self.time_index = index.min(last);
                Effects {
                    debounce: true,
                    ..Effects::none()
                }
            }
            Action::TogglePlay => {
                self.animating = !self.animating && periods > 0;
                Effects::none()
            }
            Action::Advance => {
                if !self.animating || periods == 0 {
                    return Effects::none();
                }
                self.time_index = (self.time_index + 1) % periods;
                if self.time_index == 0 {
                    self.animating = false;
                }
                Effects::time_changed(Paint::Immediate)
            }
            Action::SelectUnit(index) => {
                self.selected = Some(index);
                Effects {
                    rebuild_series: true,
                    ..Effects::none()
                }
            }
            Action::ClosePanel => match self.selected.take() {
                Some(_) => Effects {
                    hide_series: true,
                    ..Effects::none()
                },
                None => Effects::none(),
            },
        }
    }
}
