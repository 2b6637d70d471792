//! Static candidate parts used when the retailer catalog is unavailable.

use crate::core::part::{Category, Part, PartDetails};

/// (name, brand, price, specs) rows per category.
type Row = (&'static str, &'static str, f64, &'static str);

const CPU: &[Row] = &[
    ("Ryzen 5 5600", "AMD", 139.0, "6C/12T, 4.4GHz"),
    ("Ryzen 7 7800X3D", "AMD", 439.0, "8C/16T, 5.0GHz + 3D V-Cache"),
    ("Ryzen 9 7950X", "AMD", 613.0, "16C/32T, 5.7GHz"),
    ("Core i5-13400F", "Intel", 199.0, "10C/16T, 4.6GHz"),
    ("Core i7-14700K", "Intel", 426.0, "20C/28T, 5.6GHz"),
    ("Core i9-14900K", "Intel", 666.0, "24C/32T, 6.0GHz"),
];

const MOTHERBOARD: &[Row] = &[
    ("B450 AORUS M", "Gigabyte", 79.0, "AMD AM4, DDR4"),
    ("B550 GAMING PLUS", "MSI", 119.0, "AMD AM4, DDR4, PCIe 4.0"),
    ("B650 AORUS ELITE", "Gigabyte", 199.0, "AMD AM5, DDR5, PCIe 5.0"),
    ("X670E AORUS MASTER", "Gigabyte", 399.0, "AMD AM5, DDR5"),
    ("B760 GAMING X", "Gigabyte", 159.0, "Intel LGA1700, DDR5"),
    ("Z790 AORUS MASTER", "Gigabyte", 449.0, "Intel LGA1700"),
];

const GPU: &[Row] = &[
    ("RTX 3050", "NVIDIA", 259.0, "8GB GDDR6"),
    ("RX 6600", "AMD", 219.0, "8GB GDDR6"),
    ("RTX 4060 Ti", "NVIDIA", 429.0, "8GB GDDR6X, DLSS 3"),
    ("RX 7800 XT", "AMD", 573.0, "16GB GDDR6"),
    ("RTX 4070", "NVIDIA", 666.0, "12GB GDDR6X"),
    ("RTX 4080", "NVIDIA", 1333.0, "16GB GDDR6X"),
    ("RX 7900 XTX", "AMD", 1066.0, "24GB GDDR6"),
];

const RAM: &[Row] = &[
    ("Corsair Vengeance 16GB", "Corsair", 53.0, "DDR4 3200MHz"),
    ("Kingston Fury 16GB", "Kingston", 59.0, "DDR4 3600MHz"),
    ("Corsair Vengeance 32GB", "Corsair", 119.0, "DDR5 6000MHz"),
    ("G.Skill Trident Z5 32GB", "G.Skill", 146.0, "DDR5 6400MHz"),
    ("Kingston Fury 64GB", "Kingston", 239.0, "DDR5 6000MHz"),
];

const STORAGE: &[Row] = &[
    ("Kingston NV2 500GB", "Kingston", 39.0, "NVMe Gen4, 3500MB/s"),
    ("WD Blue SN580 1TB", "WD", 66.0, "NVMe Gen4, 4150MB/s"),
    ("Samsung 980 PRO 1TB", "Samsung", 106.0, "NVMe Gen4, 7000MB/s"),
    ("WD Black SN850X 2TB", "WD", 199.0, "NVMe Gen4, 7300MB/s"),
    ("Crucial P5 Plus 2TB", "Crucial", 173.0, "NVMe Gen4, 6600MB/s"),
];

const PSU: &[Row] = &[
    ("Cooler Master 550W", "Cooler Master", 53.0, "550W, 80+ Bronze"),
    ("Corsair CX650", "Corsair", 66.0, "650W, 80+ Bronze"),
    ("Seasonic Focus GX-750", "Seasonic", 106.0, "750W, 80+ Gold"),
    ("Corsair RM850x", "Corsair", 133.0, "850W, 80+ Gold, modular"),
    ("Seasonic Focus GX-1000", "Seasonic", 173.0, "1000W, 80+ Gold"),
    ("be quiet! Straight Power 11", "be quiet!", 199.0, "1000W, 80+ Platinum"),
];

const CASE: &[Row] = &[
    ("Cooler Master Q300L", "Cooler Master", 46.0, "Micro-ATX"),
    ("NZXT H510", "NZXT", 79.0, "ATX"),
    ("Corsair 4000D Airflow", "Corsair", 106.0, "ATX, high airflow"),
    ("NZXT H7 Flow", "NZXT", 133.0, "ATX, RGB"),
    ("Lian Li O11 Dynamic", "Lian Li", 159.0, "ATX, showcase glass"),
    ("Fractal Torrent", "Fractal", 199.0, "ATX, maximum airflow"),
];

const fn rows(category: Category) -> &'static [Row] {
    match category {
        Category::Cpu => CPU,
        Category::Motherboard => MOTHERBOARD,
        Category::Gpu => GPU,
        Category::Ram => RAM,
        Category::Storage => STORAGE,
        Category::Psu => PSU,
        Category::Case => CASE,
    }
}

/// The built-in candidate list for a category. Never empty.
#[must_use]
pub fn fallback_parts(category: Category) -> Vec<Part> {
    rows(category)
        .iter()
        .enumerate()
        .map(|(index, (name, brand, price, specs))| Part {
            id: format!("fallback-{category}-{}", index + 1),
            name: (*name).to_string(),
            brand: (*brand).to_string(),
            price: *price,
            category,
            details: PartDetails {
                specs: (*specs).to_string(),
                list_price: Some(*price),
                in_stock: true,
                ..PartDetails::default()
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_fallback_parts() {
        for category in Category::ALL {
            let parts = fallback_parts(category);
            assert!(!parts.is_empty(), "{category} has no fallback parts");
            assert!(parts.iter().all(|part| part.category == category));
            assert!(parts.iter().all(|part| part.validate().is_ok()));
        }
    }

    #[test]
    fn test_fallback_ids_are_unique() {
        let mut ids: Vec<String> = Category::ALL
            .into_iter()
            .flat_map(fallback_parts)
            .map(|part| part.id)
            .collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }
}
