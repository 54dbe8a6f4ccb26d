//! Static category encodings for the two categorical record fields.
//!
//! Both tables are total: every input string, known or not, resolves to a
//! code. Codes match the integer labels the predictors were fitted with.

/// Industry sector of a business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndustrySector {
    Retail,
    Restaurant,
    Healthcare,
    Construction,
    Manufacturing,
    ProfessionalServices,
    Transportation,
    Agriculture,
    Technology,
    Other,
}

impl IndustrySector {
    /// All sectors in code order.
    pub const ALL: [IndustrySector; 10] = [
        IndustrySector::Retail,
        IndustrySector::Restaurant,
        IndustrySector::Healthcare,
        IndustrySector::Construction,
        IndustrySector::Manufacturing,
        IndustrySector::ProfessionalServices,
        IndustrySector::Transportation,
        IndustrySector::Agriculture,
        IndustrySector::Technology,
        IndustrySector::Other,
    ];

    /// Sector used for unknown or missing names.
    pub const FALLBACK: IndustrySector = IndustrySector::Other;

    /// Resolve a sector name. Unknown names map to [`IndustrySector::Other`].
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "Retail" => IndustrySector::Retail,
            "Restaurant" => IndustrySector::Restaurant,
            "Healthcare" => IndustrySector::Healthcare,
            "Construction" => IndustrySector::Construction,
            "Manufacturing" => IndustrySector::Manufacturing,
            "Professional Services" => IndustrySector::ProfessionalServices,
            "Transportation" => IndustrySector::Transportation,
            "Agriculture" => IndustrySector::Agriculture,
            "Technology" => IndustrySector::Technology,
            _ => Self::FALLBACK,
        }
    }

    /// Name as it appears in input data.
    pub fn name(&self) -> &'static str {
        match self {
            IndustrySector::Retail => "Retail",
            IndustrySector::Restaurant => "Restaurant",
            IndustrySector::Healthcare => "Healthcare",
            IndustrySector::Construction => "Construction",
            IndustrySector::Manufacturing => "Manufacturing",
            IndustrySector::ProfessionalServices => "Professional Services",
            IndustrySector::Transportation => "Transportation",
            IndustrySector::Agriculture => "Agriculture",
            IndustrySector::Technology => "Technology",
            IndustrySector::Other => "Other",
        }
    }

    /// Integer code fed to the predictors.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

/// Louisiana parish the business operates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionParish {
    Ouachita,
    Caddo,
    EastBatonRouge,
    Jefferson,
    Lafayette,
    Orleans,
    Rapides,
    Calcasieu,
    Bossier,
    Tangipahoa,
}

impl RegionParish {
    /// All parishes in code order.
    pub const ALL: [RegionParish; 10] = [
        RegionParish::Ouachita,
        RegionParish::Caddo,
        RegionParish::EastBatonRouge,
        RegionParish::Jefferson,
        RegionParish::Lafayette,
        RegionParish::Orleans,
        RegionParish::Rapides,
        RegionParish::Calcasieu,
        RegionParish::Bossier,
        RegionParish::Tangipahoa,
    ];

    /// Parish used for unknown or missing names (first listed).
    pub const FALLBACK: RegionParish = RegionParish::Ouachita;

    /// Resolve a parish name. Unknown names map to the fallback parish.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "Ouachita" => RegionParish::Ouachita,
            "Caddo" => RegionParish::Caddo,
            "East Baton Rouge" => RegionParish::EastBatonRouge,
            "Jefferson" => RegionParish::Jefferson,
            "Lafayette" => RegionParish::Lafayette,
            "Orleans" => RegionParish::Orleans,
            "Rapides" => RegionParish::Rapides,
            "Calcasieu" => RegionParish::Calcasieu,
            "Bossier" => RegionParish::Bossier,
            "Tangipahoa" => RegionParish::Tangipahoa,
            _ => Self::FALLBACK,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RegionParish::Ouachita => "Ouachita",
            RegionParish::Caddo => "Caddo",
            RegionParish::EastBatonRouge => "East Baton Rouge",
            RegionParish::Jefferson => "Jefferson",
            RegionParish::Lafayette => "Lafayette",
            RegionParish::Orleans => "Orleans",
            RegionParish::Rapides => "Rapides",
            RegionParish::Calcasieu => "Calcasieu",
            RegionParish::Bossier => "Bossier",
            RegionParish::Tangipahoa => "Tangipahoa",
        }
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }
}

/// Encode an optional sector name; `None` yields the fallback code.
pub fn encode_industry(name: Option<&str>) -> u8 {
    name.map(IndustrySector::from_name)
        .unwrap_or(IndustrySector::FALLBACK)
        .code()
}

/// Encode an optional parish name; `None` yields the fallback code.
pub fn encode_region(name: Option<&str>) -> u8 {
    name.map(RegionParish::from_name)
        .unwrap_or(RegionParish::FALLBACK)
        .code()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_table_order() {
        for (i, sector) in IndustrySector::ALL.iter().enumerate() {
            assert_eq!(sector.code() as usize, i);
            assert_eq!(IndustrySector::from_name(sector.name()), *sector);
        }
        for (i, parish) in RegionParish::ALL.iter().enumerate() {
            assert_eq!(parish.code() as usize, i);
            assert_eq!(RegionParish::from_name(parish.name()), *parish);
        }
    }

    #[test]
    fn test_known_codes() {
        assert_eq!(encode_industry(Some("Retail")), 0);
        assert_eq!(encode_industry(Some("Professional Services")), 5);
        assert_eq!(encode_region(Some("Orleans")), 5);
        assert_eq!(encode_region(Some("Tangipahoa")), 9);
    }

    #[test]
    fn test_unknown_sector_matches_other() {
        let other = encode_industry(Some("Other"));
        assert_eq!(other, 9);
        assert_eq!(encode_industry(Some("Aerospace")), other);
        assert_eq!(encode_industry(Some("")), other);
        assert_eq!(encode_industry(None), other);
    }

    #[test]
    fn test_unknown_region_matches_fallback() {
        let fallback = encode_region(Some("Ouachita"));
        assert_eq!(fallback, 0);
        assert_eq!(encode_region(Some("St. Tammany")), fallback);
        assert_eq!(encode_region(None), fallback);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        // Training labels were exact strings; "retail" was never seen.
        assert_eq!(encode_industry(Some("retail")), IndustrySector::Other.code());
    }
}
