//! Gym Model

use serde::{Deserialize, Serialize};

/// Gym row (users joined with gyms)
///
/// `facilities` and `operating_hours` are stored as JSON text.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Gym {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub gym_code: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub facilities: String,
    pub capacity: i64,
    pub operating_hours: String,
    pub phone: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Gym {
    pub fn location(&self) -> Location {
        let coordinates = match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        };
        Location {
            address: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            zip_code: self.zip_code.clone(),
            coordinates,
        }
    }

    pub fn facility_list(&self) -> Vec<String> {
        serde_json::from_str(&self.facilities).unwrap_or_default()
    }

    pub fn hours(&self) -> OperatingHours {
        serde_json::from_str(&self.operating_hours).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

/// WGS84 coordinates; lat in [-90, 90], lng in [-180, 180]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Open/close times as "HH:MM"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub open: String,
    pub close: String,
}

impl DayHours {
    fn new(open: &str, close: &str) -> Self {
        Self {
            open: open.to_string(),
            close: close.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingHours {
    pub monday: DayHours,
    pub tuesday: DayHours,
    pub wednesday: DayHours,
    pub thursday: DayHours,
    pub friday: DayHours,
    pub saturday: DayHours,
    pub sunday: DayHours,
}

impl Default for OperatingHours {
    fn default() -> Self {
        Self {
            monday: DayHours::new("06:00", "22:00"),
            tuesday: DayHours::new("06:00", "22:00"),
            wednesday: DayHours::new("06:00", "22:00"),
            thursday: DayHours::new("06:00", "22:00"),
            friday: DayHours::new("06:00", "22:00"),
            saturday: DayHours::new("08:00", "20:00"),
            sunday: DayHours::new("08:00", "20:00"),
        }
    }
}

impl OperatingHours {
    pub fn days(&self) -> [(&'static str, &DayHours); 7] {
        [
            ("monday", &self.monday),
            ("tuesday", &self.tuesday),
            ("wednesday", &self.wednesday),
            ("thursday", &self.thursday),
            ("friday", &self.friday),
            ("saturday", &self.saturday),
            ("sunday", &self.sunday),
        ]
    }
}

/// Gym view returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GymProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub gym_code: String,
    pub is_active: bool,
    pub location: Location,
    pub facilities: Vec<String>,
    pub capacity: i64,
    pub operating_hours: OperatingHours,
    pub phone: Option<String>,
    pub created_at: i64,
}

impl From<Gym> for GymProfile {
    fn from(g: Gym) -> Self {
        let location = g.location();
        let facilities = g.facility_list();
        let operating_hours = g.hours();
        Self {
            id: g.id,
            name: g.name,
            email: g.email,
            gym_code: g.gym_code,
            is_active: g.is_active,
            location,
            facilities,
            capacity: g.capacity,
            operating_hours,
            phone: g.phone,
            created_at: g.created_at,
        }
    }
}

/// Admin create payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GymCreate {
    pub name: String,
    pub email: String,
    /// Generated when absent
    pub gym_code: Option<String>,
    pub location: Location,
    #[serde(default)]
    pub facilities: Vec<String>,
    pub capacity: i64,
    pub operating_hours: Option<OperatingHours>,
    pub phone: Option<String>,
}

/// Admin update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GymUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<Location>,
    pub facilities: Option<Vec<String>>,
    pub capacity: Option<i64>,
    pub operating_hours: Option<OperatingHours>,
    pub is_active: Option<bool>,
}
