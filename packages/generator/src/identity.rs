//! Seeded fake-identity provider.
//!
//! Produces pt-BR flavoured names, CPF-style ids with valid check digits,
//! e-mail addresses, Distrito Federal phone numbers and block/lot style
//! street addresses. Everything is drawn from the caller's random stream,
//! so identities are reproducible under a fixed seed.

use rand::Rng;
use rand::seq::SliceRandom as _;

use crate::config::IdentityConfig;

const FIRST_NAMES: &[&str] = &[
    "João", "Ana", "Carlos", "Mariana", "Lucas", "Fernanda", "Rafael", "Tatiane", "Bruno", "Aline",
    "Pedro", "Juliana", "Gabriel", "Camila", "Mateus", "Larissa", "Felipe", "Beatriz", "Thiago",
    "Patrícia", "Gustavo", "Letícia", "Diego", "Vitória", "André", "Luana",
];

const SURNAMES: &[&str] = &[
    "Silva", "Souza", "Oliveira", "Costa", "Almeida", "Lima", "Rodrigues", "Santos", "Pereira",
    "Carvalho", "Ferreira", "Gomes", "Ribeiro", "Martins", "Araújo", "Barbosa", "Moura", "Cardoso",
];

const BLOCKS: &[&str] = &["A", "B", "C", "D"];

const BUILDINGS: &[&str] = &["Alpha", "Bravo", "Delta", "Omega", "Prime", "Center"];

/// Address layouts; the region name is the street part.
#[derive(Debug, Clone, Copy)]
enum AddressTemplate {
    Apartment,
    Office,
    Unit,
}

const ADDRESS_TEMPLATES: &[AddressTemplate] = &[
    AddressTemplate::Apartment,
    AddressTemplate::Office,
    AddressTemplate::Unit,
];

/// A generated person. Fields are blanked later by missingness, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub national_id: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// Fake-data provider configured from [`IdentityConfig`].
pub struct IdentityProvider {
    national_id_prefix: u8,
    phone_area_code: String,
    email_domains: Vec<String>,
}

impl IdentityProvider {
    /// Builds a provider from a validated config.
    #[must_use]
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            national_id_prefix: config.national_id_prefix,
            phone_area_code: config.phone_area_code.clone(),
            email_domains: config.email_domains.clone(),
        }
    }

    /// Draws a full identity living in `region`.
    pub fn identity<R: Rng + ?Sized>(&self, rng: &mut R, region: &str) -> Identity {
        let first = pick(rng, FIRST_NAMES);
        let last = pick(rng, SURNAMES);
        let name = format!("{first} {last}");
        let national_id = self.national_id(rng);
        let email = self.email(rng, first, last);
        let phone = self.phone(rng);
        let address = address(rng, region);

        Identity {
            name,
            national_id,
            email,
            phone,
            address,
        }
    }

    /// CPF-style id `XXX.XXX.XXX-DD` whose first digit is the configured
    /// prefix and whose two check digits are valid.
    pub fn national_id<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let mut digits = Vec::with_capacity(11);
        digits.push(self.national_id_prefix);
        for _ in 0..8 {
            digits.push(rng.gen_range(0..10u8));
        }
        digits.push(check_digit(&digits));
        digits.push(check_digit(&digits));

        let text: String = digits.iter().map(|d| char::from(b'0' + d)).collect();
        format!(
            "{}.{}.{}-{}",
            &text[0..3],
            &text[3..6],
            &text[6..9],
            &text[9..11]
        )
    }

    fn email<R: Rng + ?Sized>(&self, rng: &mut R, first: &str, last: &str) -> String {
        let domain = self
            .email_domains
            .choose(rng)
            .map_or("example.com", String::as_str);
        let suffix: u16 = rng.gen_range(1..1000);
        format!(
            "{}.{}{suffix}@{domain}",
            ascii_fold(first),
            ascii_fold(last)
        )
    }

    fn phone<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let head: u16 = rng.gen_range(0..10_000);
        let tail: u16 = rng.gen_range(0..10_000);
        format!("({}) 9{head:04}-{tail:04}", self.phone_area_code)
    }
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, options: &[&'a str]) -> &'a str {
    options[rng.gen_range(0..options.len())]
}

fn address<R: Rng + ?Sized>(rng: &mut R, region: &str) -> String {
    match ADDRESS_TEMPLATES[rng.gen_range(0..ADDRESS_TEMPLATES.len())] {
        AddressTemplate::Apartment => {
            let block = pick(rng, BLOCKS);
            let number: u16 = rng.gen_range(100..1000);
            format!("{region} Bloco {block}, Ap {number}")
        }
        AddressTemplate::Office => {
            let lot: u8 = rng.gen_range(1..50);
            let room: u16 = rng.gen_range(100..300);
            format!("{region} Lote {lot}, Sala {room}")
        }
        AddressTemplate::Unit => {
            let building = pick(rng, BUILDINGS);
            let unit: u16 = rng.gen_range(101..250);
            format!("{region} Edifício {building}, Unidade {unit}")
        }
    }
}

/// Modulo-11 check digit over `digits` with descending weights starting
/// at `digits.len() + 1`.
fn check_digit(digits: &[u8]) -> u8 {
    let weights = (2..=digits.len() as u32 + 1).rev();
    let sum: u32 = digits
        .iter()
        .zip(weights)
        .map(|(&d, w)| u32::from(d) * w)
        .sum();
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        #[allow(clippy::cast_possible_truncation)]
        let digit = (11 - remainder) as u8;
        digit
    }
}

/// Lowercases and strips the Portuguese diacritics used in the name tables.
fn ascii_fold(value: &str) -> String {
    value
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_chacha::ChaCha20Rng;

    use super::*;

    fn provider() -> IdentityProvider {
        IdentityProvider::new(&IdentityConfig::default())
    }

    fn digits_of(national_id: &str) -> Vec<u8> {
        national_id
            .chars()
            .filter(char::is_ascii_digit)
            .map(|c| c as u8 - b'0')
            .collect()
    }

    #[test]
    fn check_digits_match_known_cpf() {
        // 529.982.247-25 is the canonical valid example.
        let base = [5, 2, 9, 9, 8, 2, 2, 4, 7];
        let first = check_digit(&base);
        assert_eq!(first, 2);
        let mut ten = base.to_vec();
        ten.push(first);
        assert_eq!(check_digit(&ten), 5);
    }

    #[test]
    fn national_ids_are_well_formed() {
        let provider = provider();
        let mut rng = ChaCha20Rng::seed_from_u64(10);
        for _ in 0..500 {
            let id = provider.national_id(&mut rng);
            assert_eq!(id.len(), 14);
            assert_eq!(&id[3..4], ".");
            assert_eq!(&id[7..8], ".");
            assert_eq!(&id[11..12], "-");
            let digits = digits_of(&id);
            assert_eq!(digits[0], 0);
            assert_eq!(check_digit(&digits[..9]), digits[9]);
            assert_eq!(check_digit(&digits[..10]), digits[10]);
        }
    }

    #[test]
    fn identities_are_reproducible() {
        let provider = provider();
        let mut a = ChaCha20Rng::seed_from_u64(77);
        let mut b = ChaCha20Rng::seed_from_u64(77);
        for _ in 0..50 {
            assert_eq!(
                provider.identity(&mut a, "W3 Sul"),
                provider.identity(&mut b, "W3 Sul")
            );
        }
    }

    #[test]
    fn contact_fields_have_expected_shape() {
        let provider = provider();
        let mut rng = ChaCha20Rng::seed_from_u64(123);
        for _ in 0..200 {
            let identity = provider.identity(&mut rng, "L2 Sul");
            assert!(identity.phone.starts_with("(61) 9"));
            assert_eq!(identity.phone.len(), "(61) 91234-5678".len());
            assert!(identity.email.is_ascii());
            assert!(identity.email.contains('@'));
            assert!(identity.address.starts_with("L2 Sul "));
            assert_eq!(identity.name.split(' ').count(), 2);
        }
    }

    #[test]
    fn folds_accents() {
        assert_eq!(ascii_fold("João"), "joao");
        assert_eq!(ascii_fold("Araújo"), "araujo");
        assert_eq!(ascii_fold("Patrícia"), "patricia");
    }
}
