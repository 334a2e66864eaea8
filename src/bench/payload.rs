//! Randomized request synthesis.
//!
//! Every generator takes the RNG explicitly so tests can seed it.

use rand::Rng;
use serde::Serialize;

/// IATA codes the generator draws from.
pub const CITIES: [&str; 94] = [
    "MOW", "MAD", "BER", "BAR", "FRA", "PAR", "AER", "OVB", "LON", "JFK", "LAX", "XAZ", "YZS", "TEK",
    "EUX", "URJ", "ROT", "HUU", "JST", "HGH", "QWF", "TRD", "YXJ", "YGV", "GNB", "LDY", "YGH", "YZR",
    "LTQ", "KIX", "FUN", "LIT", "XDM", "PHL", "INC", "URT", "DJB", "SVB", "ATQ", "DLM", "RKT", "DBA",
    "WBQ", "DAT", "MAM", "NOC", "BKG", "CIH", "NAH", "UTT", "AGA", "EAT", "KYP", "SVI", "IKT", "TRV",
    "QQH", "TKV", "YZZ", "HGD", "WJU", "ZYW", "HBZ", "CME", "PLJ", "ATM", "TIJ", "JIM", "YRF", "LUO",
    "XVC", "LBB", "CVM", "YHZ", "XFD", "PZU", "YHB", "AEX", "SYZ", "ABE", "OSU", "AEG", "DYU", "QXB",
    "ASB", "HLN", "DAC", "XWS", "MCW", "BRI", "LKH", "XPT", "YGK", "NSI",
];

/// Year of every generated date.
pub const YEAR: u16 = 2016;

/// Floor of every generated price.
pub const BASE_PRICE: i64 = 5000;

/// Exclusive upper bound of each of the two price draws.
pub const PRICE_SPREAD: i64 = 15000;

/// Fields of one `add` request, in wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddRequest {
    pub origin: &'static str,
    pub departure_date: String,
    pub destination: &'static str,
    pub return_date: String,
    pub direct: bool,
    pub price: i64,
}

impl AddRequest {
    /// A fully random request.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let (origin, destination) = random_city_pair(rng);
        Self {
            origin,
            departure_date: random_date(rng),
            destination,
            return_date: random_date(rng),
            direct: rng.gen_bool(0.5),
            price: random_price(rng),
        }
    }
}

/// Any city from [`CITIES`].
pub fn random_city<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    CITIES[rng.gen_range(0..CITIES.len())]
}

/// Two distinct cities, origin first.
pub fn random_city_pair<R: Rng + ?Sized>(rng: &mut R) -> (&'static str, &'static str) {
    let first = rng.gen_range(0..CITIES.len());
    // Draw from the remaining cities and skip over `first`.
    let mut second = rng.gen_range(0..CITIES.len() - 1);
    if second >= first {
        second += 1;
    }
    (CITIES[first], CITIES[second])
}

/// `YYYY-MM-DD` with month in 1..=11 and day in 1..=27.
pub fn random_date<R: Rng + ?Sized>(rng: &mut R) -> String {
    let month = rng.gen_range(1..=11);
    let day = rng.gen_range(1..=27);
    format!("{YEAR}-{month:02}-{day:02}")
}

/// Sum of two uniform draws on top of [`BASE_PRICE`].
pub fn random_price<R: Rng + ?Sized>(rng: &mut R) -> i64 {
    BASE_PRICE + rng.gen_range(0..PRICE_SPREAD) + rng.gen_range(0..PRICE_SPREAD)
}
