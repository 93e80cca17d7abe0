//! Locale aware text ordering for table sorts.

use std::cmp::Ordering;
use std::fmt;

use icu_collator::options::CollatorOptions;
use icu_collator::{Collator, CollatorBorrowed, CollatorPreferences};
use icu_locale_core::Locale;
use tracing::{debug, error};

pub const DEFAULT_LOCALE: &str = "ru";

/// Unicode collation for one locale (CLDR data compiled into the binary).
pub struct TextCollator {
    locale: String,
    inner: Option<CollatorBorrowed<'static>>,
}

impl TextCollator {
    pub fn for_locale(locale: &str) -> Result<Self, String> {
        let parsed: Locale = locale
            .parse()
            .map_err(|e| format!("locale \"{locale}\": {e:?}"))?;
        let inner = Collator::try_new(parsed.into(), CollatorOptions::default())
            .map_err(|e| format!("collation data for \"{locale}\": {e}"))?;
        debug!("Text collation for {locale}");
        Ok(Self {
            locale: locale.to_string(),
            inner: Some(inner),
        })
    }

    /// Like [`TextCollator::for_locale`], falling back to the root order
    /// when the locale is unknown.
    pub fn for_locale_or_root(locale: &str) -> Self {
        Self::for_locale(locale).unwrap_or_else(|e| {
            error!("Invalid collation locale, using root order: {e}");
            Self::root()
        })
    }

    pub fn root() -> Self {
        let inner = Collator::try_new(CollatorPreferences::default(), CollatorOptions::default());
        if let Err(e) = &inner {
            error!("Root collation unavailable, comparing code points: {e}");
        }
        Self {
            locale: "und".to_string(),
            inner: inner.ok(),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match &self.inner {
            Some(collator) => collator.compare(a, b),
            None => a.cmp(b),
        }
    }
}

impl Default for TextCollator {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Debug for TextCollator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextCollator")
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}
