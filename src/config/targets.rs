use super::probe_config::Target;

/// Small, favicon sized assets. Latency on these is mostly round trip time.
const SMALL_TARGETS: &[(&str, &str)] = &[
    ("GoogleFavIcon", "http://www.google.com/images/google_favicon_128.png"),
    ("Bing__FavIcon", "http://www.bing.com/s/a/bing_p.ico"),
    ("AmazonFavIcon", "https://www.amazon.com/favicon.ico"),
    ("Apple_FavIcon", "https://www.apple.com/favicon.ico"),
    ("WIFI__FavIcon", "http://192.168.1.1/0.1/gui/images/faviconNone.ico"),
];

/// Large scripts and images, used to sample throughput.
const LARGE_TARGETS: &[(&str, &str)] = &[
    (
        "ReactDomJsCDN",
        "https://unpkg.com/react-dom@16.13.1/umd/react-dom.production.min.js",
    ),
    (
        "AmazonImageLG",
        "https://images-na.ssl-images-amazon.com/images/S/amazonlive-media-prod/broadcast/3/3954005c-5c84-4157-b6a4-567710c59414_20200423130720/image/slate.jpg",
    ),
    (
        "AppleScriptLG",
        "https://www.apple.com/metrics/ac-analytics/2.9.0/scripts/ac-analytics.js",
    ),
    (
        "Azure_ImageLG",
        "https://azurecomcdn.azureedge.net/cvt-7e63ee798fb5c57c26a10e5149d1055e6600c12efc783ef793b34b8d06646c40/images/page/home/customer-tabs/cincinnati-childrens-desktop.jpg",
    ),
    (
        "GoogleImageLG",
        "https://ssl.gstatic.com/gb/images/p1_6269e604.png",
    ),
    (
        "YoutubeScript",
        "https://www.youtube.com/yts/jsbin/desktop_polymer_inlined_html_polymer_flags_v2-vflGtoGN1/desktop_polymer_inlined_html_polymer_flags_v2.js",
    ),
];

fn to_targets(entries: &[(&str, &str)]) -> Vec<Target> {
    entries
        .iter()
        .map(|(name, url)| Target::new(*name, *url))
        .collect()
}

pub fn small_targets() -> Vec<Target> {
    to_targets(SMALL_TARGETS)
}

pub fn large_targets() -> Vec<Target> {
    to_targets(LARGE_TARGETS)
}
