//! Localized message templates.

use std::fmt;

/// Supported message languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    De,
    #[default]
    En,
    Fr,
    It,
    Es,
}

impl Locale {
    /// Every supported locale.
    pub const ALL: [Locale; 5] = [Self::De, Self::En, Self::Fr, Self::It, Self::Es];

    /// Resolves a language tag such as `de`, `de-CH` or `fr_FR`.
    ///
    /// Only the primary subtag is considered. Unsupported or empty tags
    /// fall back to English.
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag
            .split(['-', '_'])
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        match primary.as_str() {
            "de" => Self::De,
            "fr" => Self::Fr,
            "it" => Self::It,
            "es" => Self::Es,
            _ => Self::En,
        }
    }

    /// Two-letter code.
    pub fn code(self) -> &'static str {
        match self {
            Self::De => "de",
            Self::En => "en",
            Self::Fr => "fr",
            Self::It => "it",
            Self::Es => "es",
        }
    }

    /// Message template with `{distance}` and `{consumption}` placeholders.
    pub fn template(self) -> &'static str {
        match self {
            Self::De => {
                "Mit deiner aktuellen Solarenergie könntest du bei einem Verbrauch von \
                 {consumption} kWh/100 km etwa {distance} km fahren (z. B. Berlin–München)."
            }
            Self::En => {
                "With your current solar energy you could drive about {distance} km at a \
                 consumption of {consumption} kWh/100 km (e.g. Berlin–Munich)."
            }
            Self::Fr => {
                "Avec votre énergie solaire actuelle, vous pourriez parcourir environ \
                 {distance} km pour une consommation de {consumption} kWh/100 km \
                 (par ex. Berlin–Munich)."
            }
            Self::It => {
                "Con la tua energia solare attuale potresti percorrere circa {distance} km \
                 con un consumo di {consumption} kWh/100 km (ad es. Berlino–Monaco)."
            }
            Self::Es => {
                "Con tu energía solar actual podrías recorrer aproximadamente {distance} km \
                 con un consumo de {consumption} kWh/100 km (p. ej., Berlín–Múnich)."
            }
        }
    }

    /// Renders the message for a range and consumption, both shown with one decimal.
    pub fn message(self, distance_km: f64, consumption_kwh_per_100km: f64) -> String {
        self.template()
            .replace("{distance}", &format!("{distance_km:.1}"))
            .replace("{consumption}", &format!("{consumption_kwh_per_100km:.1}"))
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
