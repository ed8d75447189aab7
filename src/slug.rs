/// Derives a URL-safe slug: lowercase ASCII letters and digits, with every
/// run of other characters collapsed into a single `-`. Accented Latin
/// letters are folded to their base letter; other scripts are dropped.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for ch in input.chars() {
        let folded = match fold_latin(ch) {
            Some(base) => base,
            None if ch.is_ascii_alphanumeric() => {
                push_part(&mut slug, &mut pending_dash, ch.encode_utf8(&mut [0; 4]));
                continue;
            }
            None if ch.is_alphanumeric() => continue,
            None => {
                pending_dash = true;
                continue;
            }
        };
        push_part(&mut slug, &mut pending_dash, folded);
    }

    slug
}

fn push_part(slug: &mut String, pending_dash: &mut bool, part: &str) {
    if *pending_dash && !slug.is_empty() {
        slug.push('-');
    }
    *pending_dash = false;
    slug.extend(part.chars().map(|c| c.to_ascii_lowercase()));
}

/// Base letters for the accented Latin characters found in make and color
/// names.
fn fold_latin(ch: char) -> Option<&'static str> {
    let base = match ch.to_lowercase().next().unwrap_or(ch) {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'ğ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => "i",
        'ł' | 'ľ' | 'ĺ' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'œ' => "oe",
        'ř' | 'ŕ' => "r",
        'ś' | 'š' | 'ş' | 'ș' => "s",
        'ß' => "ss",
        'ť' | 'ţ' | 'ț' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        'þ' => "th",
        _ => return None,
    };
    Some(base)
}

pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && slugify(slug) == slug
}
