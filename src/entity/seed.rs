//! Demo records for `--offline` mode.

use crate::collection::RecordId;

use super::{Company, CompanySummary, Customer};

const COMPANIES: &[(&str, &str, &str)] = &[
    ("Acme Corporation", "Springfield", "US"),
    ("Globex", "Cypress Creek", "US"),
    ("Initech", "Austin", "US"),
    ("Umbrella Supplies", "Raccoon City", "US"),
    ("Stark Fabrication", "Toronto", "CA"),
    ("Wayne Logistics", "Gotham", "US"),
    ("Hooli", "Palo Alto", "US"),
    ("Vandelay Industries", "New York", "US"),
    ("Soylent Foods", "Vancouver", "CA"),
    ("Tyrell Trading", "Los Angeles", "US"),
    ("Acme Logistics", "Halifax", "CA"),
    ("Oceanic Freight", "Sydney", "AU"),
];

const CUSTOMERS: &[(&str, &str)] = &[
    ("Ada", "Lovelace"),
    ("Grace", "Hopper"),
    ("Alan", "Turing"),
    ("Katherine", "Johnson"),
    ("Edsger", "Dijkstra"),
    ("Barbara", "Liskov"),
    ("Donald", "Knuth"),
    ("Margaret", "Hamilton"),
    ("Dennis", "Ritchie"),
    ("Frances", "Allen"),
    ("Ken", "Thompson"),
    ("Radia", "Perlman"),
    ("John", "McCarthy"),
    ("Hedy", "Lamarr"),
    ("Tim", "Berners-Lee"),
    ("Annie", "Easley"),
    ("Linus", "Torvalds"),
    ("Shafi", "Goldwasser"),
    ("Bjarne", "Stroustrup"),
    ("Joan", "Clarke"),
    ("Niklaus", "Wirth"),
    ("Sophie", "Wilson"),
    ("Guido", "van Rossum"),
    ("Mary", "Kenneth Keller"),
    ("Leslie", "Lamport"),
];

fn slug(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

pub fn demo_companies() -> Vec<Company> {
    COMPANIES
        .iter()
        .zip(1..)
        .map(|(&(name, city, country), id)| Company {
            id: RecordId(id),
            name: name.to_string(),
            email: Some(format!("info@{}.test", slug(name))),
            phone: Some(format!("+1 555 01{id:02}")),
            city: Some(city.to_string()),
            country: Some(country.to_string()),
            ..Default::default()
        })
        .collect()
}

/// Customers spread over the demo companies; every third one has a Shopify id.
pub fn demo_customers() -> Vec<Customer> {
    let companies = demo_companies();
    CUSTOMERS
        .iter()
        .zip(1..)
        .map(|(&(first, last), id)| {
            let company = &companies[(id as usize - 1) % companies.len()];
            Customer {
                id: RecordId(id),
                first_name: Some(first.to_string()),
                last_name: Some(last.to_string()),
                full_name: Some(format!("{first} {last}")),
                email: Some(format!("{}.{}@example.com", slug(first), slug(last))),
                phone: None,
                shopify_id: (id % 3 == 0).then(|| format!("gid://shopify/Customer/{}", 7000 + id)),
                company: Some(CompanySummary {
                    id: company.id,
                    name: company.name.clone(),
                }),
            }
        })
        .collect()
}
