//! User-Facing Messages
//!
//! Every string shown to the user is looked up here by [`MessageId`], so
//! control flow never carries literal text. Russian is the default locale.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported display languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ru,
    En,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ru" => Ok(Locale::Ru),
            "en" => Ok(Locale::En),
            other => Err(format!("Unknown locale: {}", other)),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::Ru => write!(f, "ru"),
            Locale::En => write!(f, "en"),
        }
    }
}

/// Identifier for every piece of user-facing text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageId {
    // Login view
    LoginTitle,
    LoginButton,
    InvalidCredentials,
    LoginFailed,

    // Register view
    RegisterTitle,
    RegisterButton,
    RegisterSuccess,
    RegisterRejected,
    RegisterFailed,

    // Shared form labels
    LoginPlaceholder,
    PasswordPlaceholder,

    // Chart view
    MonitoringTitle,
    NotLoggedIn,
    FetchFailed,
    Loading,
    NoData,
    ChartTitle,
    TimeAxis,
    SignalAxis,
    ThresholdWarning,
    EmergencyCall,
    ExportChart,

    NotFound,
}

impl MessageId {
    /// Resolve this message in the given locale
    pub fn text(self, locale: Locale) -> &'static str {
        text(self, locale)
    }
}

/// Look up the text for a message
pub fn text(id: MessageId, locale: Locale) -> &'static str {
    use MessageId::*;

    match locale {
        Locale::Ru => match id {
            LoginTitle => "Авторизация",
            LoginButton => "Войти",
            InvalidCredentials => "Неверный логин или пароль.",
            LoginFailed => "Ошибка при выполнении авторизации.",
            RegisterTitle => "Регистрация",
            RegisterButton => "Зарегистрироваться",
            RegisterSuccess => "Регистрация прошла успешно! Перенаправляем на страницу входа...",
            RegisterRejected => "Ошибка регистрации.",
            RegisterFailed => "Ошибка при выполнении регистрации.",
            LoginPlaceholder => "Логин",
            PasswordPlaceholder => "Пароль",
            MonitoringTitle => "Мониторинг ЭКГ",
            NotLoggedIn => "Идентификатор пользователя не найден. Пожалуйста, войдите.",
            FetchFailed => "Не удалось загрузить данные ЭКГ. Попробуйте ещё раз.",
            Loading => "Загрузка данных ЭКГ...",
            NoData => "Данные ЭКГ отсутствуют.",
            ChartTitle => "Сигнал ЭКГ",
            TimeAxis => "Время",
            SignalAxis => "Значение сигнала ЭКГ",
            ThresholdWarning => "Внимание! Значение сигнала превышает допустимый порог.",
            EmergencyCall => "Вызвать скорую помощь",
            ExportChart => "Сохранить график",
            NotFound => "Страница не найдена",
        },
        Locale::En => match id {
            LoginTitle => "Sign in",
            LoginButton => "Log in",
            InvalidCredentials => "Invalid login or password.",
            LoginFailed => "Login request failed.",
            RegisterTitle => "Registration",
            RegisterButton => "Register",
            RegisterSuccess => "Registration successful! Redirecting to the login page...",
            RegisterRejected => "Registration failed.",
            RegisterFailed => "Registration request failed.",
            LoginPlaceholder => "Login",
            PasswordPlaceholder => "Password",
            MonitoringTitle => "ECG Monitoring",
            NotLoggedIn => "No user ID found. Please log in.",
            FetchFailed => "Failed to fetch ECG data. Please try again.",
            Loading => "Loading ECG data...",
            NoData => "No ECG data available.",
            ChartTitle => "ECG Signal",
            TimeAxis => "Time",
            SignalAxis => "ECG Signal Value",
            ThresholdWarning => "Warning! Signal value exceeds the safe threshold.",
            EmergencyCall => "Call emergency services",
            ExportChart => "Save chart",
            NotFound => "Page not found",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_locale_is_russian() {
        assert_eq!(Locale::default(), Locale::Ru);
        assert_eq!(
            text(MessageId::InvalidCredentials, Locale::default()),
            "Неверный логин или пароль."
        );
    }

    #[test]
    fn test_english_lookup() {
        assert_eq!(MessageId::NoData.text(Locale::En), "No ECG data available.");
        assert_eq!(MessageId::NotLoggedIn.text(Locale::En), "No user ID found. Please log in.");
    }

    #[test]
    fn test_locale_parse() {
        assert_eq!("EN".parse::<Locale>().unwrap(), Locale::En);
        assert_eq!("ru".parse::<Locale>().unwrap(), Locale::Ru);
        assert!("de".parse::<Locale>().is_err());
    }
}
