/*
 *  lang.rs
 *
 *  SkyDeck - eyes on the horizon
 *  (c) 2020-26 Stuart Hunter
 *
 *  Fixed UI phrases per language. Weather condition texts arrive
 *  already localized from the provider (lang query parameter); these
 *  tables cover only the labels the dashboard itself draws.
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    #[default]
    English,
    Spanish,
}

impl Lang {
    /// Provider-facing language code.
    pub fn code(self) -> &'static str {
        match self {
            Lang::English => "en",
            Lang::Spanish => "es",
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code {
            "es" | "es-ES" | "spanish" => Lang::Spanish,
            _ => Lang::English,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phrase {
    Today,
    Windchill,
    Windspeed,
    Direction,
    Barometer,
    Humidity,
    LastUpdated,
    Visibility,
    UviLow,
    UviMedium,
    UviHigh,
    UviVeryHigh,
    UviExtreme,
    TodayUvIndex,
    TodayHighWind,
}

pub fn phrase(lang: Lang, p: Phrase) -> &'static str {
    match lang {
        Lang::Spanish => match p {
            Phrase::Today => "Hoy",
            Phrase::Windchill => "Sensaci\u{00f3}n t\u{00e9}rmica",
            Phrase::Windspeed => "Viento",
            Phrase::Direction => "Direcci\u{00f3}n",
            Phrase::Barometer => "Bar\u{00f3}metro",
            Phrase::Humidity => "Humedad",
            Phrase::LastUpdated => "\u{00da}ltima Actualizaci\u{00f3}n",
            Phrase::Visibility => "Visibilidad",
            Phrase::UviLow => "Bajo",
            Phrase::UviMedium => "Medio",
            Phrase::UviHigh => "Alto",
            Phrase::UviVeryHigh => "Muy Alto",
            Phrase::UviExtreme => "Extremo",
            Phrase::TodayUvIndex => "Hoy, \u{00cd}ndice UV",
            Phrase::TodayHighWind => "Hoy, Viento Alto",
        },
        Lang::English => match p {
            Phrase::Today => "Today",
            Phrase::Windchill => "Windchill",
            Phrase::Windspeed => "Windspeed",
            Phrase::Direction => "Direction",
            Phrase::Barometer => "Barometer",
            Phrase::Humidity => "Humidity",
            Phrase::LastUpdated => "Last Updated",
            Phrase::Visibility => "Visibility",
            Phrase::UviLow => "Low",
            Phrase::UviMedium => "Medium",
            Phrase::UviHigh => "High",
            Phrase::UviVeryHigh => "Very High",
            Phrase::UviExtreme => "Extreme",
            Phrase::TodayUvIndex => "Today, UV Index",
            Phrase::TodayHighWind => "Today, High Wind",
        },
    }
}

/// Bucket a UV index into its severity phrase.
pub fn uvi_level(uvi: f64) -> Phrase {
    match uvi as i64 {
        i64::MIN..=2 => Phrase::UviLow,
        3..=5 => Phrase::UviMedium,
        6..=7 => Phrase::UviHigh,
        8..=10 => Phrase::UviVeryHigh,
        _ => Phrase::UviExtreme,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lang_from_code() {
        assert_eq!(Lang::from_code("es"), Lang::Spanish);
        assert_eq!(Lang::from_code("en"), Lang::English);
        assert_eq!(Lang::from_code("fr"), Lang::English);
    }

    #[test]
    fn test_uvi_buckets() {
        assert_eq!(uvi_level(0.0), Phrase::UviLow);
        assert_eq!(uvi_level(4.4), Phrase::UviMedium);
        assert_eq!(uvi_level(7.9), Phrase::UviHigh);
        assert_eq!(uvi_level(10.2), Phrase::UviVeryHigh);
        assert_eq!(uvi_level(11.0), Phrase::UviExtreme);
    }
}
