//! Built-in ISO 3166-1 registry.
//!
//! Names follow the ISO short names; `official` and `common` carry the
//! alternative spellings most often seen in statistical exports.

/// One ISO 3166-1 entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountryEntry {
    pub alpha3: &'static str,
    pub name: &'static str,
    pub official: Option<&'static str>,
    pub common: Option<&'static str>,
}

impl CountryEntry {
    /// All spellings of this entry, short name first.
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.name).chain(self.official).chain(self.common)
    }
}

const fn c(alpha3: &'static str, name: &'static str) -> CountryEntry {
    CountryEntry {
        alpha3,
        name,
        official: None,
        common: None,
    }
}

const fn co(alpha3: &'static str, name: &'static str, official: &'static str) -> CountryEntry {
    CountryEntry {
        alpha3,
        name,
        official: Some(official),
        common: None,
    }
}

const fn cc(
    alpha3: &'static str,
    name: &'static str,
    official: &'static str,
    common: &'static str,
) -> CountryEntry {
    CountryEntry {
        alpha3,
        name,
        official: Some(official),
        common: Some(common),
    }
}

pub static COUNTRIES: &[CountryEntry] = &[
    co("ABW", "Aruba", "Aruba"),
    co("AFG", "Afghanistan", "Islamic Republic of Afghanistan"),
    co("AGO", "Angola", "Republic of Angola"),
    c("AIA", "Anguilla"),
    c("ALA", "Åland Islands"),
    co("ALB", "Albania", "Republic of Albania"),
    co("AND", "Andorra", "Principality of Andorra"),
    c("ARE", "United Arab Emirates"),
    co("ARG", "Argentina", "Argentine Republic"),
    co("ARM", "Armenia", "Republic of Armenia"),
    c("ASM", "American Samoa"),
    c("ATA", "Antarctica"),
    c("ATF", "French Southern Territories"),
    c("ATG", "Antigua and Barbuda"),
    c("AUS", "Australia"),
    co("AUT", "Austria", "Republic of Austria"),
    co("AZE", "Azerbaijan", "Republic of Azerbaijan"),
    co("BDI", "Burundi", "Republic of Burundi"),
    co("BEL", "Belgium", "Kingdom of Belgium"),
    co("BEN", "Benin", "Republic of Benin"),
    cc(
        "BES",
        "Bonaire, Sint Eustatius and Saba",
        "Bonaire, Sint Eustatius and Saba",
        "Caribbean Netherlands",
    ),
    c("BFA", "Burkina Faso"),
    co("BGD", "Bangladesh", "People's Republic of Bangladesh"),
    co("BGR", "Bulgaria", "Republic of Bulgaria"),
    co("BHR", "Bahrain", "Kingdom of Bahrain"),
    co("BHS", "Bahamas", "Commonwealth of the Bahamas"),
    c("BIH", "Bosnia and Herzegovina"),
    c("BLM", "Saint Barthélemy"),
    co("BLR", "Belarus", "Republic of Belarus"),
    c("BLZ", "Belize"),
    c("BMU", "Bermuda"),
    cc("BOL", "Bolivia, Plurinational State of", "Plurinational State of Bolivia", "Bolivia"),
    co("BRA", "Brazil", "Federative Republic of Brazil"),
    c("BRB", "Barbados"),
    c("BRN", "Brunei Darussalam"),
    co("BTN", "Bhutan", "Kingdom of Bhutan"),
    c("BVT", "Bouvet Island"),
    co("BWA", "Botswana", "Republic of Botswana"),
    c("CAF", "Central African Republic"),
    c("CAN", "Canada"),
    c("CCK", "Cocos (Keeling) Islands"),
    co("CHE", "Switzerland", "Swiss Confederation"),
    co("CHL", "Chile", "Republic of Chile"),
    co("CHN", "China", "People's Republic of China"),
    co("CIV", "Côte d'Ivoire", "Republic of Côte d'Ivoire"),
    co("CMR", "Cameroon", "Republic of Cameroon"),
    c("COD", "Congo, The Democratic Republic of the"),
    co("COG", "Congo", "Republic of the Congo"),
    c("COK", "Cook Islands"),
    co("COL", "Colombia", "Republic of Colombia"),
    co("COM", "Comoros", "Union of the Comoros"),
    co("CPV", "Cabo Verde", "Republic of Cabo Verde"),
    co("CRI", "Costa Rica", "Republic of Costa Rica"),
    co("CUB", "Cuba", "Republic of Cuba"),
    co("CUW", "Curaçao", "Curaçao"),
    c("CXR", "Christmas Island"),
    c("CYM", "Cayman Islands"),
    co("CYP", "Cyprus", "Republic of Cyprus"),
    co("CZE", "Czechia", "Czech Republic"),
    co("DEU", "Germany", "Federal Republic of Germany"),
    co("DJI", "Djibouti", "Republic of Djibouti"),
    co("DMA", "Dominica", "Commonwealth of Dominica"),
    co("DNK", "Denmark", "Kingdom of Denmark"),
    c("DOM", "Dominican Republic"),
    co("DZA", "Algeria", "People's Democratic Republic of Algeria"),
    co("ECU", "Ecuador", "Republic of Ecuador"),
    co("EGY", "Egypt", "Arab Republic of Egypt"),
    c("ERI", "Eritrea"),
    c("ESH", "Western Sahara"),
    co("ESP", "Spain", "Kingdom of Spain"),
    co("EST", "Estonia", "Republic of Estonia"),
    co("ETH", "Ethiopia", "Federal Democratic Republic of Ethiopia"),
    co("FIN", "Finland", "Republic of Finland"),
    co("FJI", "Fiji", "Republic of Fiji"),
    c("FLK", "Falkland Islands (Malvinas)"),
    co("FRA", "France", "French Republic"),
    c("FRO", "Faroe Islands"),
    co("FSM", "Micronesia, Federated States of", "Federated States of Micronesia"),
    co("GAB", "Gabon", "Gabonese Republic"),
    c("GBR", "United Kingdom"),
    c("GEO", "Georgia"),
    c("GGY", "Guernsey"),
    co("GHA", "Ghana", "Republic of Ghana"),
    c("GIB", "Gibraltar"),
    co("GIN", "Guinea", "Republic of Guinea"),
    c("GLP", "Guadeloupe"),
    co("GMB", "Gambia", "Republic of the Gambia"),
    co("GNB", "Guinea-Bissau", "Republic of Guinea-Bissau"),
    co("GNQ", "Equatorial Guinea", "Republic of Equatorial Guinea"),
    co("GRC", "Greece", "Hellenic Republic"),
    c("GRD", "Grenada"),
    c("GRL", "Greenland"),
    co("GTM", "Guatemala", "Republic of Guatemala"),
    c("GUF", "French Guiana"),
    c("GUM", "Guam"),
    co("GUY", "Guyana", "Republic of Guyana"),
    co("HKG", "Hong Kong", "Hong Kong Special Administrative Region of China"),
    c("HMD", "Heard Island and McDonald Islands"),
    co("HND", "Honduras", "Republic of Honduras"),
    co("HRV", "Croatia", "Republic of Croatia"),
    co("HTI", "Haiti", "Republic of Haiti"),
    co("HUN", "Hungary", "Hungary"),
    co("IDN", "Indonesia", "Republic of Indonesia"),
    c("IMN", "Isle of Man"),
    co("IND", "India", "Republic of India"),
    c("IOT", "British Indian Ocean Territory"),
    c("IRL", "Ireland"),
    cc("IRN", "Iran, Islamic Republic of", "Islamic Republic of Iran", "Iran"),
    co("IRQ", "Iraq", "Republic of Iraq"),
    co("ISL", "Iceland", "Republic of Iceland"),
    co("ISR", "Israel", "State of Israel"),
    co("ITA", "Italy", "Italian Republic"),
    c("JAM", "Jamaica"),
    c("JEY", "Jersey"),
    co("JOR", "Jordan", "Hashemite Kingdom of Jordan"),
    c("JPN", "Japan"),
    co("KAZ", "Kazakhstan", "Republic of Kazakhstan"),
    co("KEN", "Kenya", "Republic of Kenya"),
    co("KGZ", "Kyrgyzstan", "Kyrgyz Republic"),
    co("KHM", "Cambodia", "Kingdom of Cambodia"),
    co("KIR", "Kiribati", "Republic of Kiribati"),
    c("KNA", "Saint Kitts and Nevis"),
    cc("KOR", "Korea, Republic of", "Republic of Korea", "South Korea"),
    co("KWT", "Kuwait", "State of Kuwait"),
    c("LAO", "Lao People's Democratic Republic"),
    co("LBN", "Lebanon", "Lebanese Republic"),
    co("LBR", "Liberia", "Republic of Liberia"),
    co("LBY", "Libya", "Libya"),
    c("LCA", "Saint Lucia"),
    co("LIE", "Liechtenstein", "Principality of Liechtenstein"),
    co("LKA", "Sri Lanka", "Democratic Socialist Republic of Sri Lanka"),
    co("LSO", "Lesotho", "Kingdom of Lesotho"),
    co("LTU", "Lithuania", "Republic of Lithuania"),
    co("LUX", "Luxembourg", "Grand Duchy of Luxembourg"),
    co("LVA", "Latvia", "Republic of Latvia"),
    co("MAC", "Macao", "Macao Special Administrative Region of China"),
    c("MAF", "Saint Martin (French part)"),
    co("MAR", "Morocco", "Kingdom of Morocco"),
    co("MCO", "Monaco", "Principality of Monaco"),
    cc("MDA", "Moldova, Republic of", "Republic of Moldova", "Moldova"),
    co("MDG", "Madagascar", "Republic of Madagascar"),
    co("MDV", "Maldives", "Republic of Maldives"),
    co("MEX", "Mexico", "United Mexican States"),
    co("MHL", "Marshall Islands", "Republic of the Marshall Islands"),
    co("MKD", "North Macedonia", "Republic of North Macedonia"),
    co("MLI", "Mali", "Republic of Mali"),
    co("MLT", "Malta", "Republic of Malta"),
    co("MMR", "Myanmar", "Republic of Myanmar"),
    c("MNE", "Montenegro"),
    c("MNG", "Mongolia"),
    co("MNP", "Northern Mariana Islands", "Commonwealth of the Northern Mariana Islands"),
    co("MOZ", "Mozambique", "Republic of Mozambique"),
    co("MRT", "Mauritania", "Islamic Republic of Mauritania"),
    c("MSR", "Montserrat"),
    c("MTQ", "Martinique"),
    co("MUS", "Mauritius", "Republic of Mauritius"),
    co("MWI", "Malawi", "Republic of Malawi"),
    c("MYS", "Malaysia"),
    c("MYT", "Mayotte"),
    co("NAM", "Namibia", "Republic of Namibia"),
    c("NCL", "New Caledonia"),
    co("NER", "Niger", "Republic of the Niger"),
    c("NFK", "Norfolk Island"),
    co("NGA", "Nigeria", "Federal Republic of Nigeria"),
    co("NIC", "Nicaragua", "Republic of Nicaragua"),
    c("NIU", "Niue"),
    co("NLD", "Netherlands", "Kingdom of the Netherlands"),
    co("NOR", "Norway", "Kingdom of Norway"),
    co("NPL", "Nepal", "Federal Democratic Republic of Nepal"),
    co("NRU", "Nauru", "Republic of Nauru"),
    c("NZL", "New Zealand"),
    co("OMN", "Oman", "Sultanate of Oman"),
    co("PAK", "Pakistan", "Islamic Republic of Pakistan"),
    co("PAN", "Panama", "Republic of Panama"),
    c("PCN", "Pitcairn"),
    co("PER", "Peru", "Republic of Peru"),
    co("PHL", "Philippines", "Republic of the Philippines"),
    co("PLW", "Palau", "Republic of Palau"),
    c("PNG", "Papua New Guinea"),
    co("POL", "Poland", "Republic of Poland"),
    c("PRI", "Puerto Rico"),
    cc(
        "PRK",
        "Korea, Democratic People's Republic of",
        "Democratic People's Republic of Korea",
        "North Korea",
    ),
    co("PRT", "Portugal", "Portuguese Republic"),
    co("PRY", "Paraguay", "Republic of Paraguay"),
    co("PSE", "Palestine, State of", "the State of Palestine"),
    c("PYF", "French Polynesia"),
    co("QAT", "Qatar", "State of Qatar"),
    c("REU", "Réunion"),
    c("ROU", "Romania"),
    c("RUS", "Russian Federation"),
    co("RWA", "Rwanda", "Rwandese Republic"),
    co("SAU", "Saudi Arabia", "Kingdom of Saudi Arabia"),
    co("SDN", "Sudan", "Republic of the Sudan"),
    co("SEN", "Senegal", "Republic of Senegal"),
    co("SGP", "Singapore", "Republic of Singapore"),
    c("SGS", "South Georgia and the South Sandwich Islands"),
    c("SHN", "Saint Helena, Ascension and Tristan da Cunha"),
    c("SJM", "Svalbard and Jan Mayen"),
    c("SLB", "Solomon Islands"),
    co("SLE", "Sierra Leone", "Republic of Sierra Leone"),
    co("SLV", "El Salvador", "Republic of El Salvador"),
    co("SMR", "San Marino", "Republic of San Marino"),
    co("SOM", "Somalia", "Federal Republic of Somalia"),
    c("SPM", "Saint Pierre and Miquelon"),
    co("SRB", "Serbia", "Republic of Serbia"),
    co("SSD", "South Sudan", "Republic of South Sudan"),
    co("STP", "Sao Tome and Principe", "Democratic Republic of Sao Tome and Principe"),
    co("SUR", "Suriname", "Republic of Suriname"),
    co("SVK", "Slovakia", "Slovak Republic"),
    co("SVN", "Slovenia", "Republic of Slovenia"),
    co("SWE", "Sweden", "Kingdom of Sweden"),
    co("SWZ", "Eswatini", "Kingdom of Eswatini"),
    co("SXM", "Sint Maarten (Dutch part)", "Sint Maarten (Dutch part)"),
    co("SYC", "Seychelles", "Republic of Seychelles"),
    c("SYR", "Syrian Arab Republic"),
    c("TCA", "Turks and Caicos Islands"),
    co("TCD", "Chad", "Republic of Chad"),
    co("TGO", "Togo", "Togolese Republic"),
    co("THA", "Thailand", "Kingdom of Thailand"),
    co("TJK", "Tajikistan", "Republic of Tajikistan"),
    c("TKL", "Tokelau"),
    c("TKM", "Turkmenistan"),
    co("TLS", "Timor-Leste", "Democratic Republic of Timor-Leste"),
    co("TON", "Tonga", "Kingdom of Tonga"),
    co("TTO", "Trinidad and Tobago", "Republic of Trinidad and Tobago"),
    co("TUN", "Tunisia", "Republic of Tunisia"),
    co("TUR", "Türkiye", "Republic of Türkiye"),
    c("TUV", "Tuvalu"),
    cc("TWN", "Taiwan, Province of China", "Taiwan, Province of China", "Taiwan"),
    cc("TZA", "Tanzania, United Republic of", "United Republic of Tanzania", "Tanzania"),
    co("UGA", "Uganda", "Republic of Uganda"),
    c("UKR", "Ukraine"),
    c("UMI", "United States Minor Outlying Islands"),
    co("URY", "Uruguay", "Eastern Republic of Uruguay"),
    co("USA", "United States", "United States of America"),
    co("UZB", "Uzbekistan", "Republic of Uzbekistan"),
    c("VAT", "Holy See (Vatican City State)"),
    c("VCT", "Saint Vincent and the Grenadines"),
    cc("VEN", "Venezuela, Bolivarian Republic of", "Bolivarian Republic of Venezuela", "Venezuela"),
    co("VGB", "Virgin Islands, British", "British Virgin Islands"),
    co("VIR", "Virgin Islands, U.S.", "Virgin Islands of the United States"),
    cc("VNM", "Viet Nam", "Socialist Republic of Viet Nam", "Vietnam"),
    co("VUT", "Vanuatu", "Republic of Vanuatu"),
    c("WLF", "Wallis and Futuna"),
    co("WSM", "Samoa", "Independent State of Samoa"),
    co("YEM", "Yemen", "Republic of Yemen"),
    co("ZAF", "South Africa", "Republic of South Africa"),
    co("ZMB", "Zambia", "Republic of Zambia"),
    co("ZWE", "Zimbabwe", "Republic of Zimbabwe"),
];

/// Look up an entry by alpha-3 code (case-insensitive).
pub fn by_alpha3(code: &str) -> Option<&'static CountryEntry> {
    let code = code.trim();
    COUNTRIES.iter().find(|e| e.alpha3.eq_ignore_ascii_case(code))
}

/// Look up an entry by its ISO short name (case-insensitive).
pub fn by_name(name: &str) -> Option<&'static CountryEntry> {
    let name = name.trim();
    COUNTRIES.iter().find(|e| e.name.to_lowercase() == name.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_are_unique_and_well_formed() {
        let mut seen = HashSet::new();
        for e in COUNTRIES {
            assert_eq!(e.alpha3.len(), 3, "{}", e.alpha3);
            assert!(e.alpha3.chars().all(|c| c.is_ascii_uppercase()), "{}", e.alpha3);
            assert!(seen.insert(e.alpha3), "duplicate {}", e.alpha3);
        }
        assert!(COUNTRIES.len() > 240);
    }

    #[test]
    fn lookups_are_case_insensitive() {
        assert_eq!(by_alpha3("deu").map(|e| e.name), Some("Germany"));
        assert_eq!(by_name("germany").map(|e| e.alpha3), Some("DEU"));
        assert!(by_alpha3("WLD").is_none());
    }
}
