use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub id: String,
    pub name: String,
    pub sessions: u32,
    /// Total price in euro cents.
    pub price: u32,
    pub savings: Option<String>,
    #[serde(default)]
    pub popular: bool,
    /// The free first-session offer. Restricted to users without bookings.
    #[serde(default)]
    pub trial: bool,
    pub features: Vec<String>,
}
