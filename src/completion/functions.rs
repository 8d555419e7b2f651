//! Built-in interpolation functions offered by completion.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinFunction {
    pub name: &'static str,
    pub parameters: &'static [&'static str],
    pub description: &'static str,
}

impl BuiltinFunction {
    const fn new(
        name: &'static str,
        parameters: &'static [&'static str],
        description: &'static str,
    ) -> BuiltinFunction {
        BuiltinFunction {
            name,
            parameters,
            description,
        }
    }

    /// `name(param, ...)`
    pub fn prototype(&self) -> String {
        format!("{}({})", self.name, self.parameters.join(", "))
    }

    /// Snippet with one tab stop per parameter, optionally wrapped in `${...}`.
    pub fn snippet(&self, wrap_interpolation: bool) -> String {
        let placeholders = self
            .parameters
            .iter()
            .enumerate()
            .map(|(i, parameter)| format!("${{{}:{}}}", i + 1, parameter))
            .collect::<Vec<_>>()
            .join(", ");
        let call = format!("{}({})", self.name, placeholders);

        if wrap_interpolation {
            format!("${{{call}}}")
        } else {
            call
        }
    }
}

pub static BUILTIN_FUNCTIONS: &[BuiltinFunction] = &[
    BuiltinFunction::new("abs", &["float"], "Absolute value of a number."),
    BuiltinFunction::new("basename", &["path"], "Last element of a path."),
    BuiltinFunction::new("base64decode", &["string"], "Decodes a base64 string."),
    BuiltinFunction::new("base64encode", &["string"], "Base64 encoding of a string."),
    BuiltinFunction::new("base64gzip", &["string"], "Gzips a string and base64 encodes it."),
    BuiltinFunction::new("base64sha256", &["string"], "Base64 encoded SHA256 digest."),
    BuiltinFunction::new("base64sha512", &["string"], "Base64 encoded SHA512 digest."),
    BuiltinFunction::new("bcrypt", &["password", "cost"], "Blowfish hash of a password."),
    BuiltinFunction::new("ceil", &["float"], "Smallest integer not less than the value."),
    BuiltinFunction::new("chomp", &["string"], "Removes trailing newlines."),
    BuiltinFunction::new("chunklist", &["list", "size"], "Splits a list into chunks of `size`."),
    BuiltinFunction::new("cidrhost", &["iprange", "hostnum"], "Host address within a CIDR range."),
    BuiltinFunction::new("cidrnetmask", &["iprange"], "Netmask of a CIDR range."),
    BuiltinFunction::new(
        "cidrsubnet",
        &["iprange", "newbits", "netnum"],
        "Subnet address within a CIDR range.",
    ),
    BuiltinFunction::new("coalesce", &["string1", "string2", "..."], "First non-empty string."),
    BuiltinFunction::new("coalescelist", &["list1", "list2", "..."], "First non-empty list."),
    BuiltinFunction::new("compact", &["list"], "Removes empty strings from a list."),
    BuiltinFunction::new("concat", &["list1", "list2", "..."], "Joins lists together."),
    BuiltinFunction::new("contains", &["list", "element"], "Whether a list contains an element."),
    BuiltinFunction::new("dirname", &["path"], "All but the last element of a path."),
    BuiltinFunction::new("distinct", &["list"], "Removes duplicate list items."),
    BuiltinFunction::new("element", &["list", "index"], "List item at an index, wrapping around."),
    BuiltinFunction::new("file", &["path"], "Contents of a file."),
    BuiltinFunction::new("floor", &["float"], "Greatest integer not greater than the value."),
    BuiltinFunction::new("flatten", &["list of lists"], "Flattens nested lists."),
    BuiltinFunction::new("format", &["format", "args", "..."], "printf style formatting."),
    BuiltinFunction::new(
        "formatlist",
        &["format", "args", "..."],
        "printf style formatting over lists.",
    ),
    BuiltinFunction::new("indent", &["numspaces", "string"], "Indents every line but the first."),
    BuiltinFunction::new("index", &["list", "elem"], "Index of an element in a list."),
    BuiltinFunction::new("join", &["delim", "list"], "Joins a list with a delimiter."),
    BuiltinFunction::new("jsonencode", &["value"], "JSON encoding of a value."),
    BuiltinFunction::new("keys", &["map"], "Sorted keys of a map."),
    BuiltinFunction::new("length", &["list"], "Number of items in a list, map or string."),
    BuiltinFunction::new("list", &["items", "..."], "List of the arguments."),
    BuiltinFunction::new("log", &["x", "base"], "Logarithm of x."),
    BuiltinFunction::new("lookup", &["map", "key", "[default]"], "Map lookup with a default."),
    BuiltinFunction::new("lower", &["string"], "Lowercase copy of a string."),
    BuiltinFunction::new("map", &["key", "value", "..."], "Map of the key/value arguments."),
    BuiltinFunction::new(
        "matchkeys",
        &["values", "keys", "searchset"],
        "Values whose keys are in the search set.",
    ),
    BuiltinFunction::new("max", &["float1", "float2", "..."], "Largest of the numbers."),
    BuiltinFunction::new("merge", &["map1", "map2", "..."], "Union of maps."),
    BuiltinFunction::new("min", &["float1", "float2", "..."], "Smallest of the numbers."),
    BuiltinFunction::new("md5", &["string"], "Hex MD5 digest."),
    BuiltinFunction::new("pathexpand", &["string"], "Path with `~` expanded."),
    BuiltinFunction::new("pow", &["x", "y"], "x raised to the power y."),
    BuiltinFunction::new(
        "replace",
        &["string", "search", "replace"],
        "Search and replace in a string.",
    ),
    BuiltinFunction::new("rsadecrypt", &["string", "key"], "RSA decryption of a string."),
    BuiltinFunction::new("sha1", &["string"], "Hex SHA1 digest."),
    BuiltinFunction::new("sha256", &["string"], "Hex SHA256 digest."),
    BuiltinFunction::new("sha512", &["string"], "Hex SHA512 digest."),
    BuiltinFunction::new("signum", &["integer"], "Sign of a number."),
    BuiltinFunction::new("slice", &["list", "from", "to"], "Portion of a list."),
    BuiltinFunction::new("sort", &["list"], "Lexically sorted list."),
    BuiltinFunction::new("split", &["delim", "string"], "Splits a string into a list."),
    BuiltinFunction::new("substr", &["string", "offset", "length"], "Substring of a string."),
    BuiltinFunction::new("timestamp", &[], "Current UTC time in RFC 3339."),
    BuiltinFunction::new("timeadd", &["time", "duration"], "Timestamp plus a duration."),
    BuiltinFunction::new("title", &["string"], "Title cased copy of a string."),
    BuiltinFunction::new("transpose", &["map"], "Swaps keys and list values of a map."),
    BuiltinFunction::new("trimspace", &["string"], "Removes surrounding whitespace."),
    BuiltinFunction::new("upper", &["string"], "Uppercase copy of a string."),
    BuiltinFunction::new("urlencode", &["string"], "URL-safe copy of a string."),
    BuiltinFunction::new("uuid", &[], "Random RFC 4122 v4 UUID."),
    BuiltinFunction::new("values", &["map"], "Values of a map in key order."),
    BuiltinFunction::new("zipmap", &["list", "list"], "Map built from a key list and a value list."),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_placeholders() {
        let lookup = BUILTIN_FUNCTIONS.iter().find(|f| f.name == "lookup").unwrap();

        assert_eq!(lookup.prototype(), "lookup(map, key, [default])");
        assert_eq!(lookup.snippet(false), "lookup(${1:map}, ${2:key}, ${3:[default]})");
    }

    #[test]
    fn test_snippet_wrapped_in_interpolation() {
        let uuid = BUILTIN_FUNCTIONS.iter().find(|f| f.name == "uuid").unwrap();

        assert_eq!(uuid.snippet(true), "${uuid()}");
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = BUILTIN_FUNCTIONS.iter().map(|f| f.name).collect();
        names.sort_unstable();
        names.dedup();

        assert_eq!(names.len(), BUILTIN_FUNCTIONS.len());
    }
}
