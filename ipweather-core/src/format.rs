use std::io::{self, Write};

use colored::{Color, Colorize};

use crate::model::{Units, WeatherReport};

/// Renders a [`WeatherReport`] as a fixed text block.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormatter {
    colorize: bool,
}

impl TextFormatter {
    pub fn plain() -> Self {
        Self { colorize: false }
    }

    /// Colours the temperature line. `colored` still honours `NO_COLOR` and non-tty stdout.
    pub fn colored() -> Self {
        Self { colorize: true }
    }

    pub fn render(&self, report: &WeatherReport) -> String {
        let temperature = format!(
            "{}\u{00B0}{}",
            report.temperature.round() as i64,
            report.units.temperature_symbol()
        );
        let temperature = if self.colorize {
            temperature.color(temperature_color(report.temperature, report.units)).to_string()
        } else {
            temperature
        };

        let mut out = String::new();
        out.push_str(&format!("Weather for {}\n", report.location_name));
        out.push_str(&format!("Temperature: {temperature}\n"));
        out.push_str(&format!("Condition:   {} {}\n", report.sky.icon(), report.condition));
        out.push_str(&format!("Humidity:    {}%\n", report.humidity_pct));
        out.push_str(&format!("Wind:        {:.1} {}\n", report.wind_speed, report.units.wind_unit()));
        if let Some(observed) = report.observation_time {
            out.push_str(&format!("Observed:    {}\n", observed.format("%Y-%m-%d %H:%M UTC")));
        }
        out
    }

    pub fn write_report(&self, report: &WeatherReport, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(self.render(report).as_bytes())?;
        out.flush()
    }
}

/// Cold to hot, judged in Fahrenheit.
pub fn temperature_color(temperature: f64, units: Units) -> Color {
    let fahrenheit = match units {
        Units::Fahrenheit => temperature,
        Units::Celsius => temperature * 9.0 / 5.0 + 32.0,
    };

    if fahrenheit <= 40.0 {
        Color::Cyan
    } else if fahrenheit <= 60.0 {
        Color::Blue
    } else if fahrenheit <= 80.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::model::Sky;

    fn report() -> WeatherReport {
        WeatherReport {
            provider: "test".into(),
            location_name: "Cupertino, California, United States".into(),
            temperature: 72.0,
            units: Units::Fahrenheit,
            condition: "Clear".into(),
            sky: Sky::Sun,
            humidity_pct: 41,
            wind_speed: 5.8,
            observation_time: None,
        }
    }

    #[test]
    fn output_contains_temperature_and_condition() {
        let text = TextFormatter::plain().render(&report());

        assert!(text.contains("72"));
        assert!(text.contains("Clear"));
    }

    #[test]
    fn renders_fixed_block() {
        let mut report = report();
        report.observation_time = Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());

        let text = TextFormatter::plain().render(&report);

        assert_eq!(
            text,
            "Weather for Cupertino, California, United States\n\
             Temperature: 72\u{00B0}F\n\
             Condition:   \u{2600} Clear\n\
             Humidity:    41%\n\
             Wind:        5.8 mph\n\
             Observed:    2024-05-01 12:00 UTC\n"
        );
    }

    #[test]
    fn celsius_uses_metric_labels_and_rounds() {
        let report = WeatherReport {
            temperature: -0.4,
            units: Units::Celsius,
            wind_speed: 3.0,
            ..report()
        };

        let text = TextFormatter::plain().render(&report);

        assert!(text.contains("Temperature: 0\u{00B0}C\n"));
        assert!(text.contains("Wind:        3.0 m/s\n"));
        assert!(!text.contains("Observed"));
    }

    #[test]
    fn write_report_writes_rendered_text() {
        let mut buf = Vec::new();
        TextFormatter::plain().write_report(&report(), &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), TextFormatter::plain().render(&report()));
    }

    #[test]
    fn temperature_colors_by_band() {
        assert_eq!(temperature_color(32.0, Units::Fahrenheit), Color::Cyan);
        assert_eq!(temperature_color(55.0, Units::Fahrenheit), Color::Blue);
        assert_eq!(temperature_color(72.0, Units::Fahrenheit), Color::Yellow);
        assert_eq!(temperature_color(95.0, Units::Fahrenheit), Color::Red);
        assert_eq!(temperature_color(30.0, Units::Celsius), Color::Red);
        assert_eq!(temperature_color(0.0, Units::Celsius), Color::Cyan);
    }
}
