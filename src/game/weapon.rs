use strum::EnumIter;

/// Item definition of a weapon, as reported by the game.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum WeaponId {
    #[default]
    None,

    // Pistols
    Glock,
    Hkp2000,
    UspS,
    Elite,
    P250,
    Tec9,
    Fiveseven,
    Cz75a,
    Deagle,
    Revolver,

    // SMGs
    Mac10,
    Mp9,
    Mp7,
    Mp5sd,
    Ump45,
    P90,
    Bizon,

    // Rifles
    GalilAr,
    Famas,
    Ak47,
    M4A1,
    M4a1S,
    Sg553,
    Aug,

    // Snipers
    Ssg08,
    Awp,
    G3SG1,
    Scar20,

    // Shotguns
    Nova,
    Xm1014,
    Sawedoff,
    Mag7,

    // Machineguns
    M249,
    Negev,

    // Grenades
    Flashbang,
    HeGrenade,
    SmokeGrenade,
    Molotov,
    Decoy,
    IncGrenade,
    TaGrenade,
    Firebomb,
    Diversion,
    FragGrenade,
    Snowball,

    // Melee
    Axe,
    Hammer,
    Spanner,
    Knife,
    KnifeT,
    Bayonet,
    Flip,
    Gut,
    Karambit,
    M9Bayonet,
    Huntsman,
    Bowie,
    Butterfly,
    Daggers,
    Falchion,

    // Other
    C4,
    Healthshot,
    BumpMine,
    ZoneRepulsor,
    Shield,
    Taser,
}

/// Weapon category from the weapon's script data.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeaponType {
    Knife,
    Pistol,
    SubMachinegun,
    Rifle,
    Shotgun,
    SniperRifle,
    Machinegun,
    C4,
    Placeholder,
    Grenade,
    Melee,
    StackableItem,
    Fists,
    BreachCharge,
    BumpMine,
    Tablet,
    #[default]
    Unknown,
}

impl WeaponType {
    pub fn is_sniper_rifle(self) -> bool {
        self == Self::SniperRifle
    }

    pub fn is_pistol(self) -> bool {
        self == Self::Pistol
    }
}

/// Script data of a weapon.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WeaponInfo {
    pub kind: WeaponType,
    /// Localization key of the display name.
    pub name: String,
    pub max_clip: i32,
}

impl WeaponId {
    /// English name, also the key used for per-weapon configuration.
    /// Unlisted items map to "All".
    pub fn name(self) -> &'static str {
        use WeaponId::*;
        match self {
            Glock => "Glock-18",
            Hkp2000 => "P2000",
            UspS => "USP-S",
            Elite => "Dual Berettas",
            P250 => "P250",
            Tec9 => "Tec-9",
            Fiveseven => "Five-SeveN",
            Cz75a => "CZ75-Auto",
            Deagle => "Desert Eagle",
            Revolver => "R8 Revolver",

            Mac10 => "MAC-10",
            Mp9 => "MP9",
            Mp7 => "MP7",
            Mp5sd => "MP5-SD",
            Ump45 => "UMP-45",
            P90 => "P90",
            Bizon => "PP-Bizon",

            GalilAr => "Galil AR",
            Famas => "FAMAS",
            Ak47 => "AK-47",
            M4A1 => "M4A4",
            M4a1S => "M4A1-S",
            Sg553 => "SG 553",
            Aug => "AUG",

            Ssg08 => "SSG 08",
            Awp => "AWP",
            G3SG1 => "G3SG1",
            Scar20 => "SCAR-20",

            Nova => "Nova",
            Xm1014 => "XM1014",
            Sawedoff => "Sawed-Off",
            Mag7 => "MAG-7",

            M249 => "M249",
            Negev => "Negev",

            Flashbang => "Flashbang",
            HeGrenade => "HE Grenade",
            SmokeGrenade => "Smoke Grenade",
            Molotov => "Molotov",
            Decoy => "Decoy Grenade",
            IncGrenade => "Incendiary",
            TaGrenade => "TA Grenade",
            Firebomb => "Fire Bomb",
            Diversion => "Diversion",
            FragGrenade => "Frag Grenade",
            Snowball => "Snowball",

            Axe => "Axe",
            Hammer => "Hammer",
            Spanner => "Wrench",

            C4 => "C4",
            Healthshot => "Healthshot",
            BumpMine => "Bump Mine",
            ZoneRepulsor => "Zone Repulsor",
            Shield => "Shield",

            _ => "All",
        }
    }

    /// Glyph in the weapon icon font. Items without a glyph use their name.
    pub fn icon(self) -> &'static str {
        use WeaponId::*;
        match self {
            Glock => "E",
            Hkp2000 => "D",
            UspS => "G",
            Elite => "B",
            P250 => "F",
            Tec9 => "H",
            Fiveseven => "C",
            Cz75a => "I",
            Deagle => "A",
            Revolver => "J",

            Mac10 => "K",
            Mp9 => "O",
            Mp7 => "N",
            Mp5sd | Ump45 => "L",
            P90 => "P",
            Bizon => "M",

            GalilAr => "Q",
            Famas => "R",
            Ak47 => "W",
            M4A1 => "S",
            M4a1S => "T",
            Sg553 => "V",
            Aug => "U",

            Ssg08 => "a",
            Awp => "Z",
            G3SG1 => "X",
            Scar20 => "Y",

            Nova => "e",
            Xm1014 => "b",
            Sawedoff => "c",
            Mag7 => "d",

            M249 => "g",
            Negev => "f",

            Flashbang => "i",
            HeGrenade => "j",
            SmokeGrenade => "k",
            Molotov | IncGrenade => "l",
            Decoy => "m",

            C4 => "o",
            Taser => "h",

            Bayonet | Knife | KnifeT => "1",
            Flip => "2",
            Gut => "3",
            Karambit => "4",
            M9Bayonet => "5",
            Huntsman => "6",
            Bowie => "7",
            Butterfly => "8",
            Daggers => "9",
            Falchion => "10",

            _ => self.name(),
        }
    }

    /// Configuration group of a weapon; falls back to "All" for uncategorized items.
    pub fn group(self, kind: WeaponType) -> &'static str {
        match kind {
            WeaponType::Pistol => "Pistols",
            WeaponType::SubMachinegun => "SMGs",
            WeaponType::Rifle => "Rifles",
            WeaponType::SniperRifle => "Sniper Rifles",
            WeaponType::Shotgun => "Shotguns",
            WeaponType::Machinegun => "Machineguns",
            WeaponType::Grenade => "Grenades",
            WeaponType::Melee => "Melee",
            _ => match self {
                WeaponId::C4
                | WeaponId::Healthshot
                | WeaponId::BumpMine
                | WeaponId::ZoneRepulsor
                | WeaponId::Shield => "Other",
                _ => "All",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn groups_follow_weapon_type() {
        assert_eq!(WeaponId::Ak47.group(WeaponType::Rifle), "Rifles");
        assert_eq!(WeaponId::Awp.group(WeaponType::SniperRifle), "Sniper Rifles");
        assert_eq!(WeaponId::C4.group(WeaponType::C4), "Other");
        assert_eq!(WeaponId::Taser.group(WeaponType::Unknown), "All");
    }

    #[test]
    fn unnamed_items_fall_back_to_all() {
        assert_eq!(WeaponId::Knife.name(), "All");
        assert_eq!(WeaponId::None.name(), "All");
        assert_eq!(WeaponId::M4A1.name(), "M4A4");
    }

    #[test]
    fn items_without_glyph_use_their_name() {
        assert_eq!(WeaponId::Ak47.icon(), "W");
        assert_eq!(WeaponId::Molotov.icon(), WeaponId::IncGrenade.icon());
        assert_eq!(WeaponId::Healthshot.icon(), "Healthshot");
        assert_eq!(WeaponId::None.icon(), "All");
    }

    #[test]
    fn every_weapon_has_an_icon() {
        for weapon in WeaponId::iter() {
            assert!(!weapon.icon().is_empty(), "{weapon:?}");
        }
    }
}
