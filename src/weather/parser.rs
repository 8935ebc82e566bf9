//! Best-effort extraction of weather observations from agent output
//!
//! Tool-calling agents return either a structured JSON payload or prose.
//! Both parsers produce the same [`WeatherObservation`]; anything they
//! cannot find keeps its default value.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

use super::open_meteo::weather_code_to_description;
use crate::models::WeatherObservation;

/// Extracts an observation for one location from raw text
pub trait ObservationParser: Send + Sync {
    /// `None` when the text holds nothing usable for `location`
    fn parse(&self, text: &str, location: &str) -> Option<WeatherObservation>;
}

fn short_name(location: &str) -> String {
    location
        .split(',')
        .next()
        .unwrap_or(location)
        .trim()
        .to_lowercase()
}

const PRECIPITATION_KEYS: [&str; 3] = [
    "precipitation_probability",
    "precipitation_probability_max",
    "precipitation",
];
const WIND_KEYS: [&str; 4] = ["wind_speed_kmh", "wind_speed", "windspeed", "wind_speed_10m_max"];
const TEMPERATURE_KEYS: [&str; 3] = ["temperature_celsius", "temperature", "temperature_2m_max"];
const CODE_KEYS: [&str; 2] = ["weather_code", "weathercode"];
const CONDITION_KEYS: [&str; 2] = ["condition", "description"];

/// Parses JSON objects (or arrays of objects keyed by `location`)
#[derive(Debug, Default, Clone)]
pub struct JsonObservationParser;

impl JsonObservationParser {
    fn number(object: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
        keys.iter().find_map(|key| match object.get(*key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().trim_end_matches('%').parse().ok(),
            _ => None,
        })
    }

    fn text(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
        keys.iter()
            .find_map(|key| object.get(*key)?.as_str().map(str::to_string))
    }

    fn from_object(object: &Map<String, Value>, location: &str) -> Option<WeatherObservation> {
        let precipitation = Self::number(object, &PRECIPITATION_KEYS);
        let wind = Self::number(object, &WIND_KEYS);
        let temperature = Self::number(object, &TEMPERATURE_KEYS);
        let code = Self::number(object, &CODE_KEYS);
        let condition = Self::text(object, &CONDITION_KEYS);

        if precipitation.is_none()
            && wind.is_none()
            && temperature.is_none()
            && code.is_none()
            && condition.is_none()
        {
            return None;
        }

        let mut observation = WeatherObservation::unknown(location);
        if let Some(p) = precipitation {
            observation.precipitation_probability = p.round() as i32;
        }
        if let Some(w) = wind {
            observation.wind_speed_kmh = w;
        }
        if let Some(t) = temperature {
            observation.temperature_celsius = t;
        }
        if let Some(c) = code {
            observation.weather_code = c.round() as i32;
        }
        if let Some(condition) = condition {
            observation.condition = condition;
        } else if code.is_some() {
            observation.condition =
                weather_code_to_description(observation.weather_code).to_string();
        }
        Some(observation)
    }

    /// The JSON document in `text`: the whole text or a fenced block
    fn document(text: &str) -> Option<Value> {
        let trimmed = text.trim();
        if let Ok(value) = serde_json::from_str(trimmed) {
            return Some(value);
        }
        let start = trimmed.find("```json")? + "```json".len();
        let end = trimmed[start..].find("```")? + start;
        serde_json::from_str(trimmed[start..end].trim()).ok()
    }
}

impl ObservationParser for JsonObservationParser {
    fn parse(&self, text: &str, location: &str) -> Option<WeatherObservation> {
        let wanted = short_name(location);
        match Self::document(text)? {
            // an object without a location applies to any city
            Value::Object(object) => match object.get("location").and_then(Value::as_str) {
                Some(name) if short_name(name) != wanted => None,
                _ => Self::from_object(&object, location),
            },
            Value::Array(items) => items.iter().filter_map(Value::as_object).find_map(|object| {
                let name = object.get("location")?.as_str()?;
                if short_name(name) == wanted {
                    Self::from_object(object, location)
                } else {
                    None
                }
            }),
            _ => None,
        }
    }
}

static TEMPERATURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:temp(?:erature)?[^\d\n-]{0,20}(-?\d+(?:\.\d+)?))|(?:(-?\d+(?:\.\d+)?)\s*°\s*C)")
        .expect("valid temperature pattern")
});
static PRECIPITATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:precip\w*|rain|chance)[^\d\n]{0,30}(\d{1,3}(?:\.\d+)?)\s*%")
        .expect("valid precipitation pattern")
});
static WIND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:wind[^\d\n]{0,20}(\d+(?:\.\d+)?))|(?:(\d+(?:\.\d+)?)\s*km/h)")
        .expect("valid wind pattern")
});
static CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)code[^\d\n]{0,10}(\d{1,2})(?:\s*\(([^)\n]+)\))?")
        .expect("valid weather code pattern")
});
static CONDITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)conditions?\s*[:\-]\s*([A-Za-z][A-Za-z ]*[A-Za-z])")
        .expect("valid condition pattern")
});

/// Regex heuristics over the prose section that mentions the location
#[derive(Debug, Default, Clone)]
pub struct FreeTextObservationParser;

impl FreeTextObservationParser {
    fn is_section_break(line: &str) -> bool {
        let line = line.trim();
        line.is_empty()
            || line.starts_with('#')
            || line.to_lowercase().starts_with("leg ")
            || line.starts_with("---")
    }

    /// Candidate sections: each line naming the location plus what follows it.
    ///
    /// The flag marks sections whose first line is about the location
    /// ("Weather in Paris", "Paris:") rather than a passing mention.
    fn sections<'a>(text: &'a str, location: &str) -> Vec<(bool, Vec<&'a str>)> {
        let name = regex::escape(&short_name(location));
        let (Ok(mention), Ok(heading)) = (
            Regex::new(&format!(r"(?i)\b{name}\b")),
            Regex::new(&format!(
                r"(?i)^[\s#*>\-]*(?:(?:weather|forecast|conditions)\s+(?:in|for|at)\s+)?{name}\b"
            )),
        ) else {
            return Vec::new();
        };
        let lines: Vec<&str> = text.lines().collect();

        lines
            .iter()
            .enumerate()
            .filter(|(_, line)| mention.is_match(line))
            .map(|(i, line)| {
                let mut section = vec![*line];
                section.extend(
                    lines[i + 1..]
                        .iter()
                        .take_while(|next| !Self::is_section_break(next)),
                );
                (heading.is_match(line), section)
            })
            .collect()
    }

    fn capture_f64(re: &Regex, text: &str) -> Option<f64> {
        let captures = re.captures(text)?;
        captures
            .iter()
            .skip(1)
            .flatten()
            .find_map(|m| m.as_str().parse().ok())
    }

    fn from_section(section: &str, location: &str) -> (usize, WeatherObservation) {
        let mut observation = WeatherObservation::unknown(location);
        let mut found = 0;

        if let Some(t) = Self::capture_f64(&TEMPERATURE_RE, section) {
            observation.temperature_celsius = t;
            found += 1;
        }
        if let Some(p) = Self::capture_f64(&PRECIPITATION_RE, section) {
            observation.precipitation_probability = p.round() as i32;
            found += 1;
        }
        if let Some(w) = Self::capture_f64(&WIND_RE, section) {
            observation.wind_speed_kmh = w;
            found += 1;
        }

        let mut code_label = None;
        if let Some(captures) = CODE_RE.captures(section) {
            if let Some(code) = captures.get(1).and_then(|m| m.as_str().parse::<i32>().ok()) {
                observation.weather_code = code;
                found += 1;
            }
            code_label = captures.get(2).map(|m| m.as_str().trim().to_string());
        }

        if let Some(condition) = CONDITION_RE
            .captures(section)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
        {
            observation.condition = condition;
            found += 1;
        } else if let Some(label) = code_label {
            observation.condition = label;
        } else if observation.weather_code != 0 {
            observation.condition =
                weather_code_to_description(observation.weather_code).to_string();
        }

        (found, observation)
    }
}

impl ObservationParser for FreeTextObservationParser {
    fn parse(&self, text: &str, location: &str) -> Option<WeatherObservation> {
        Self::sections(text, location)
            .into_iter()
            .map(|(heading, section)| {
                let (found, observation) = Self::from_section(&section.join("\n"), location);
                ((heading, found), observation)
            })
            .filter(|((_, found), _)| *found > 0)
            // headed sections beat passing mentions, then more fields; first wins ties
            .fold(None, |best: Option<((bool, usize), WeatherObservation)>, candidate| {
                match best {
                    Some(best) if best.0 >= candidate.0 => Some(best),
                    _ => Some(candidate),
                }
            })
            .map(|(_, observation)| observation)
    }
}

/// Parse an observation for `location`, trying JSON first, then prose.
///
/// Never fails: falls back to [`WeatherObservation::unknown`].
#[must_use]
pub fn parse_observation(text: &str, location: &str) -> WeatherObservation {
    let parsers: [&dyn ObservationParser; 2] =
        [&JsonObservationParser, &FreeTextObservationParser];
    parsers
        .iter()
        .find_map(|parser| parser.parse(text, location))
        .unwrap_or_else(|| WeatherObservation::unknown(location))
}
