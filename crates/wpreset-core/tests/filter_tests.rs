//! Integration tests for the token filter passes

use proptest::prelude::*;
use wpreset_core::filter::{
    apply_all_filters, apply_wssize_parameter, FilterPipeline, PortSet, TokenPass,
    WssizeInjection,
};
use wpreset_core::{compile_preset, parse_preset_content, FilterSettings};

fn toks(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn wssize_only() -> FilterSettings {
    FilterSettings {
        wssize: true,
        ..FilterSettings::default()
    }
}

fn everything() -> FilterSettings {
    FilterSettings {
        remove_hostlists: true,
        remove_ipsets: true,
        allzone: true,
        wssize: true,
        wildcard_port_matches: false,
    }
}

// =========== wssize ===========

#[test]
fn test_wssize_port_sets() {
    let cases = [
        ("443", true),
        ("80,443", true),
        ("1-65535", true),
        ("443-443", true),
        ("400-500", true),
        ("80", false),
        ("444-65535", false),
        ("1-442", false),
        ("*", false),
        ("garbage", false),
    ];

    for (ports, injected) in cases {
        let filter = format!("--filter-tcp={ports}");
        let out = apply_wssize_parameter(toks(&[&filter, "--dpi-desync=fake"]), &wssize_only());
        assert_eq!(out.contains(&"--wssize".to_string()), injected, "for {ports}");
    }
}

#[test]
fn test_wssize_wildcard_opt_in() {
    let settings = FilterSettings {
        wildcard_port_matches: true,
        ..wssize_only()
    };
    let out = apply_wssize_parameter(toks(&["--filter-tcp=*", "--dpi-desync=fake"]), &settings);
    assert_eq!(
        out,
        toks(&[
            "--filter-tcp=*",
            "--dpi-desync=fake",
            "--wssize",
            "1:6",
            "--wssize-forced-cutoff=0",
        ])
    );
}

#[test]
fn test_wssize_placement_between_blocks() {
    let tokens = toks(&[
        "--wf-tcp=443",
        "--filter-tcp=443",
        "--dpi-desync=fake",
        "--new",
        "--filter-udp=443",
        "--dpi-desync=fake",
        "--new",
        "--filter-tcp=80",
        "--dpi-desync=split",
        "--new",
        "--filter-tcp=443",
        "--filter-l7=tls",
        "--dpi-desync=multisplit",
    ]);

    let out = apply_wssize_parameter(tokens, &wssize_only());
    assert_eq!(
        out,
        toks(&[
            "--wf-tcp=443",
            "--filter-tcp=443",
            "--dpi-desync=fake",
            "--wssize",
            "1:6",
            "--wssize-forced-cutoff=0",
            "--new",
            "--filter-udp=443",
            "--dpi-desync=fake",
            "--new",
            "--filter-tcp=80",
            "--dpi-desync=split",
            "--new",
            "--filter-tcp=443",
            "--wssize",
            "1:6",
            "--wssize-forced-cutoff=0",
            "--filter-l7=tls",
            "--dpi-desync=multisplit",
        ])
    );
}

#[test]
fn test_wssize_existing_setting_kept() {
    let tokens = toks(&["--filter-tcp=443", "--wssize=1:6", "--dpi-desync=fake"]);
    assert_eq!(apply_wssize_parameter(tokens.clone(), &wssize_only()), tokens);
}

#[test]
fn test_udp_filter_never_gets_wssize() {
    let tokens = toks(&["--filter-udp=443", "--dpi-desync=fake"]);
    assert_eq!(apply_wssize_parameter(tokens.clone(), &wssize_only()), tokens);
}

// =========== Pipeline ===========

#[test]
fn test_custom_pass_runs_in_priority_order() {
    struct Upper;

    impl TokenPass for Upper {
        fn name(&self) -> &'static str {
            "upper"
        }

        fn priority(&self) -> u8 {
            5
        }

        fn apply(&self, tokens: Vec<String>) -> Vec<String> {
            tokens.into_iter().map(|t| t.to_uppercase()).collect()
        }
    }

    let mut pipeline = FilterPipeline::from_settings(&wssize_only());
    pipeline.add_pass(Upper);
    assert_eq!(pipeline.pass_names(), vec!["upper", "wssize"]);

    // Uppercased flags no longer look like a TCP filter
    let out = pipeline.run(toks(&["--filter-tcp=443"]));
    assert_eq!(out, toks(&["--FILTER-TCP=443"]));

    let single = WssizeInjection::new(false);
    assert_eq!(single.apply(toks(&["--filter-tcp=443"])).len(), 4);
}

#[test]
fn test_removal_precedes_allzone() {
    let out = apply_all_filters(toks(&["--filter-tcp=80", "--hostlist=other.txt"]), &everything());
    assert_eq!(out, toks(&["--filter-tcp=80"]));
}

#[test]
fn test_compile_preset_end_to_end() {
    let preset = parse_preset_content(
        "# Preset: Demo\n--wf-tcp=80,443\n--wf-udp=443\n\
         --filter-tcp=80,443\n--hostlist=lists/other.txt\n--dpi-desync=fake\n--new\n\
         --filter-udp=443\n--ipset=lists/ipset-all.txt\n--dpi-desync=fake\n",
    );
    let settings = FilterSettings {
        allzone: true,
        wssize: true,
        ..FilterSettings::default()
    };

    assert_eq!(
        compile_preset(&preset, &settings),
        toks(&[
            "--wf-tcp=80,443",
            "--wf-udp=443",
            "--filter-tcp=80,443",
            "--hostlist=lists/allzone.txt",
            "--dpi-desync=fake",
            "--wssize",
            "1:6",
            "--wssize-forced-cutoff=0",
            "--new",
            "--filter-udp=443",
            "--ipset=lists/ipset-all.txt",
            "--dpi-desync=fake",
        ])
    );
}

#[test]
fn test_port_set_ranges_are_inclusive() {
    let set = PortSet::parse("80, 400-443 ,x,1000-");
    assert_eq!(set.entries().len(), 2);
    assert!(set.contains(443));
    assert!(set.contains(400));
    assert!(!set.contains(444));
}

// =========== Properties ===========

fn token_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "--filter-tcp=443",
        "--filter-tcp=80",
        "--filter-tcp=*",
        "--filter-tcp=1-65535",
        "--filter-udp=443",
        "--filter-l7=discord",
        "--new",
        "--hostlist=other.txt",
        "--hostlist=lists/other.txt",
        "--hostlist-domains=a.com",
        "--hostlist-exclude=ex.txt",
        "--ipset=ipset-all.txt",
        "--ipset-ip=1.1.1.1",
        "--dpi-desync=fake",
        "--dpi-desync-repeats=6",
        "--wssize",
        "1:6",
    ])
    .prop_map(str::to_string)
}

fn settings_strategy() -> impl Strategy<Value = FilterSettings> {
    (
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(remove_hostlists, remove_ipsets, allzone, wssize, wildcard_port_matches)| {
                FilterSettings {
                    remove_hostlists,
                    remove_ipsets,
                    allzone,
                    wssize,
                    wildcard_port_matches,
                }
            },
        )
}

proptest! {
    #[test]
    fn filters_are_idempotent(
        tokens in prop::collection::vec(token_strategy(), 0..24),
        settings in settings_strategy(),
    ) {
        let once = apply_all_filters(tokens, &settings);
        let twice = apply_all_filters(once.clone(), &settings);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn removal_leaves_no_targeting(tokens in prop::collection::vec(token_strategy(), 0..24)) {
        let out = apply_all_filters(tokens, &everything());
        prop_assert!(out.iter().all(|t| !t.starts_with("--hostlist") && !t.starts_with("--ipset")));
    }
}
