#![forbid(unsafe_code)]

//! City-markers map state.
//!
//! [`CityMap`] is the map's equivalent of a disclosure cell: a transient
//! `hovered` name that drives a tooltip and a `selected` record that opens a
//! detail overlay. Marker placement uses a Mercator projection cropped to a
//! latitude window so the inhabited latitudes fill the viewport.

use std::f64::consts::PI;

use crate::geometry::Rect;

/// One example city. Every quantity is a pre-formatted display string.
#[derive(Debug, Clone, PartialEq)]
pub struct City {
    pub name: String,
    pub country: String,
    /// Longitude in degrees, east positive.
    pub lon: f64,
    /// Latitude in degrees, north positive.
    pub lat: f64,
    pub capacity: String,
    pub population: String,
    pub details: String,
    pub year_established: String,
    pub growth: String,
    pub co2_saved: String,
    /// Color token, e.g. `"blue"`.
    pub color: String,
}

impl City {
    /// Headline facts shown in the overlay, as `(label, value)` pairs.
    #[must_use]
    pub fn facts(&self) -> [(&'static str, &str); 4] {
        [
            ("Capacity", &self.capacity),
            ("Serves", &self.population),
            ("Growth", &self.growth),
            ("Since", &self.year_established),
        ]
    }
}

/// Tooltip content for the hovered marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tooltip<'a> {
    pub name: &'a str,
    pub country: &'a str,
}

/// Mercator projection onto a terminal rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    min_lat: f64,
    max_lat: f64,
}

impl Default for Projection {
    fn default() -> Self {
        Self::new(-58.0, 75.0)
    }
}

impl Projection {
    /// A projection showing latitudes in `[min_lat, max_lat]`.
    ///
    /// Bounds are clamped to ±85° (where Mercator diverges) and swapped if
    /// given in the wrong order.
    #[must_use]
    pub fn new(min_lat: f64, max_lat: f64) -> Self {
        let a = min_lat.clamp(-85.0, 85.0);
        let b = max_lat.clamp(-85.0, 85.0);
        Self {
            min_lat: a.min(b),
            max_lat: a.max(b),
        }
    }

    fn mercator_y(lat: f64) -> f64 {
        let phi = lat.clamp(-85.0, 85.0).to_radians();
        (PI / 4.0 + phi / 2.0).tan().ln()
    }

    /// Cell of `(lon, lat)` inside `area`, or `None` if the area is empty.
    ///
    /// Points outside the latitude window are pinned to the top or bottom
    /// row.
    #[must_use]
    pub fn project(&self, lon: f64, lat: f64, area: Rect) -> Option<(u16, u16)> {
        if area.is_empty() {
            return None;
        }
        let fx = ((lon + 180.0) / 360.0).clamp(0.0, 1.0);
        let top = Self::mercator_y(self.max_lat);
        let bottom = Self::mercator_y(self.min_lat);
        let span = top - bottom;
        let fy = if span <= f64::EPSILON {
            0.5
        } else {
            ((top - Self::mercator_y(lat)) / span).clamp(0.0, 1.0)
        };
        let max_x = f64::from(area.width - 1);
        let max_y = f64::from(area.height - 1);
        let x = area.x + (fx * max_x).round() as u16;
        let y = area.y + (fy * max_y).round() as u16;
        Some((x, y))
    }
}

/// Hover and selection state over a fixed city list.
#[derive(Debug, Clone, Default)]
pub struct CityMap {
    cities: Vec<City>,
    hovered: Option<String>,
    selected: Option<City>,
    projection: Projection,
}

impl CityMap {
    /// A map over `cities` with nothing hovered or selected.
    #[must_use]
    pub fn new(cities: Vec<City>) -> Self {
        Self {
            cities,
            hovered: None,
            selected: None,
            projection: Projection::default(),
        }
    }

    /// Override the projection (builder).
    #[must_use]
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    /// All cities in display order.
    #[must_use]
    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    /// Look up a city by name.
    #[must_use]
    pub fn city(&self, name: &str) -> Option<&City> {
        self.cities.iter().find(|c| c.name == name)
    }

    /// Pointer entered the marker of `name`. Unknown names are ignored.
    pub fn pointer_enter(&mut self, name: &str) {
        if self.city(name).is_some() {
            self.hovered = Some(name.to_owned());
        }
    }

    /// Pointer left whichever marker was hovered.
    pub fn pointer_leave(&mut self) {
        self.hovered = None;
    }

    /// Name of the hovered city.
    #[must_use]
    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Tooltip for the hovered city, if any.
    #[must_use]
    pub fn tooltip(&self) -> Option<Tooltip<'_>> {
        let city = self.city(self.hovered.as_deref()?)?;
        Some(Tooltip {
            name: &city.name,
            country: &city.country,
        })
    }

    /// Click on the marker of `name`: open the overlay with its full record.
    ///
    /// Returns `false` for unknown names.
    pub fn select(&mut self, name: &str) -> bool {
        let Some(city) = self.city(name).cloned() else {
            return false;
        };
        crate::debug!(city = name, "city overlay opened");
        self.selected = Some(city);
        true
    }

    /// Close the overlay (backdrop click, close control, or Escape).
    ///
    /// Returns `true` if an overlay was open.
    pub fn dismiss(&mut self) -> bool {
        self.selected.take().is_some()
    }

    /// The city shown in the overlay.
    #[must_use]
    pub fn selected(&self) -> Option<&City> {
        self.selected.as_ref()
    }

    /// Marker cell of every city inside `area`, in display order.
    #[must_use]
    pub fn markers(&self, area: Rect) -> Vec<(&City, (u16, u16))> {
        self.cities
            .iter()
            .filter_map(|c| self.projection.project(c.lon, c.lat, area).map(|p| (c, p)))
            .collect()
    }

    /// City whose marker is at `(x, y)`, allowing one column of slack.
    ///
    /// When markers are adjacent the exact hit wins.
    #[must_use]
    pub fn hit_test(&self, area: Rect, x: u16, y: u16) -> Option<&City> {
        let markers = self.markers(area);
        markers
            .iter()
            .find(|(_, (mx, my))| *mx == x && *my == y)
            .or_else(|| {
                markers
                    .iter()
                    .find(|(_, (mx, my))| *my == y && mx.abs_diff(x) <= 1)
            })
            .map(|(c, _)| *c)
    }
}
