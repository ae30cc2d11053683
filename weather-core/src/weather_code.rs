//! WMO weather code catalog: descriptions and icon categories.
//! See: https://open-meteo.com/en/docs#weathervariables

use serde::Serialize;

/// Human-readable description of a weather code.
pub fn describe(code: i32) -> &'static str {
    match code {
        0 => "晴",
        1 => "大部晴朗",
        2 => "局部多云",
        3 => "阴",
        45 => "雾",
        48 => "冻雾",
        51 => "小毛毛雨",
        53 => "中毛毛雨",
        55 => "大毛毛雨",
        56 => "小冻毛毛雨",
        57 => "大冻毛毛雨",
        61 => "小雨",
        63 => "中雨",
        65 => "大雨",
        66 => "小冻雨",
        67 => "大冻雨",
        71 => "小雪",
        73 => "中雪",
        75 => "大雪",
        77 => "雪粒",
        80 => "小阵雨",
        81 => "中阵雨",
        82 => "强阵雨",
        85 => "小阵雪",
        86 => "大阵雪",
        95 => "雷暴",
        96 => "雷暴伴小冰雹",
        99 => "雷暴伴大冰雹",
        _ => "未知天气",
    }
}

/// Icon category for a weather code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherIcon {
    ClearDay,
    ClearNight,
    MainlyClearDay,
    MainlyClearNight,
    PartlyCloudyDay,
    PartlyCloudyNight,
    Overcast,
    Fog,
    DrizzleDay,
    DrizzleNight,
    FreezingRain,
    Rain,
    Snow,
    ShowersDay,
    ShowersNight,
    Thunderstorm,
}

impl WeatherIcon {
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::ClearDay => "☀️",
            Self::ClearNight => "🌙",
            Self::MainlyClearDay => "🌤️",
            Self::MainlyClearNight => "🌙",
            Self::PartlyCloudyDay => "⛅",
            Self::PartlyCloudyNight => "☁️",
            Self::Overcast => "☁️",
            Self::Fog => "🌫️",
            Self::DrizzleDay => "🌦️",
            Self::DrizzleNight => "🌧️",
            Self::FreezingRain => "🧊",
            Self::Rain => "🌧️",
            Self::Snow => "🌨️",
            Self::ShowersDay => "🌦️",
            Self::ShowersNight => "🌧️",
            Self::Thunderstorm => "⛈️",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ClearDay => "clear_day",
            Self::ClearNight => "clear_night",
            Self::MainlyClearDay => "mainly_clear_day",
            Self::MainlyClearNight => "mainly_clear_night",
            Self::PartlyCloudyDay => "partly_cloudy_day",
            Self::PartlyCloudyNight => "partly_cloudy_night",
            Self::Overcast => "overcast",
            Self::Fog => "fog",
            Self::DrizzleDay => "drizzle_day",
            Self::DrizzleNight => "drizzle_night",
            Self::FreezingRain => "freezing_rain",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::ShowersDay => "showers_day",
            Self::ShowersNight => "showers_night",
            Self::Thunderstorm => "thunderstorm",
        }
    }
}

/// Icon category for `code`. Unknown codes get the clear-sky icon.
pub fn icon(code: i32, is_day: bool) -> WeatherIcon {
    use WeatherIcon::*;

    let day_night = |day, night| if is_day { day } else { night };

    match code {
        1 => day_night(MainlyClearDay, MainlyClearNight),
        2 => day_night(PartlyCloudyDay, PartlyCloudyNight),
        3 => Overcast,
        45 | 48 => Fog,
        51 | 53 | 55 => day_night(DrizzleDay, DrizzleNight),
        56 | 57 | 66 | 67 => FreezingRain,
        61 | 63 | 65 => Rain,
        71 | 73 | 75 | 77 | 85 | 86 => Snow,
        80..=82 => day_night(ShowersDay, ShowersNight),
        95 | 96 | 99 => Thunderstorm,
        _ => day_night(ClearDay, ClearNight),
    }
}
