//! Fixtures: host environments, probed toolchains and on-disk ICU trees.

use std::fs;
use std::io::Write;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::core::arch::{Arch, Endianness, Os};
use crate::core::host::HostEnv;
use crate::core::layout::ProjectLayout;
use crate::core::options::Options;
use crate::core::version::CompilerVersion;
use crate::probe::{
    AssemblerInfo, AssemblerKind, CapabilitySnapshot, CompilerFamily, MacroTable, ToolchainFacts,
};
use crate::resolve::ResolveCx;

use super::{FakeFetcher, FakePackages};

/// A host with default tool commands and no kernel release.
pub fn host_env(os: Os) -> HostEnv {
    HostEnv {
        cc: "gcc".to_string(),
        cxx: "g++".to_string(),
        cc_host: None,
        pkg_config: "pkg-config".to_string(),
        nasm: "nasm".to_string(),
        processor_architecture: None,
        os,
        endianness: Endianness::Little,
        kernel_release: None,
    }
}

fn arch_marker(arch: Arch) -> &'static str {
    match arch {
        Arch::Ia32 => "__i386__",
        Arch::X64 => "__x86_64__",
        Arch::Arm => "__arm__",
        Arch::Arm64 => "__aarch64__",
        Arch::Ppc64 => "__PPC64__",
        Arch::S390 => "__s390__",
        Arch::S390x => "__s390x__",
    }
}

fn snapshot(command: &str, family: CompilerFamily, version: CompilerVersion, arch: Arch) -> CapabilitySnapshot {
    CapabilitySnapshot {
        command: command.to_string(),
        family,
        version,
        arch,
        assembler: None,
    }
}

/// GCC 12.2.0 on `arch` with binutils 2.38.
pub fn facts_for(arch: Arch) -> ToolchainFacts {
    facts_with_macros(arch, &[])
}

/// GCC 12.2.0 on `arch` whose C compiler additionally predefines `extra`.
pub fn facts_with_macros(arch: Arch, extra: &[(&str, &str)]) -> ToolchainFacts {
    let version = CompilerVersion::new(12, 2, 0);
    let mut cc = snapshot("gcc", CompilerFamily::Gcc, version, arch);
    cc.assembler = Some(AssemblerInfo::new(AssemblerKind::Gas, "2.38"));

    let mut pairs = vec![
        ("__GNUC__", "12"),
        ("__GNUC_MINOR__", "2"),
        ("__GNUC_PATCHLEVEL__", "0"),
        (arch_marker(arch), "1"),
    ];
    pairs.extend_from_slice(extra);

    ToolchainFacts {
        host_arch: arch,
        cc: Some(cc),
        cxx: Some(snapshot("g++", CompilerFamily::Gcc, version, arch)),
        cc_macros: MacroTable::from_pairs(pairs),
        nasm: None,
    }
}

/// x64 facts where both compilers are `version` of one family.
pub fn facts_with_compilers(version: CompilerVersion, clang: bool) -> ToolchainFacts {
    let family = if clang {
        CompilerFamily::Clang
    } else {
        CompilerFamily::Gcc
    };
    let mut facts = facts_for(Arch::X64);
    facts.cc = Some(snapshot("cc", family, version, Arch::X64));
    facts.cxx = Some(snapshot("c++", family, version, Arch::X64));
    facts
}

/// Run `f` against a Linux host rooted at `/src`, with pkg-config and the
/// network unavailable.
pub fn with_cx<R>(
    options: &Options,
    facts: &ToolchainFacts,
    f: impl FnOnce(&ResolveCx<'_>) -> R,
) -> R {
    let host = host_env(Os::Linux);
    let layout = ProjectLayout::new("/src");
    let packages = FakePackages::new();
    let fetcher = FakeFetcher::offline();
    let cx = ResolveCx {
        options,
        host: &host,
        facts,
        layout: &layout,
        packages: &packages,
        fetcher: &fetcher,
        minimum_icu: 64,
    };
    f(&cx)
}

/// Lay out a minimal ICU source tree of `major` under `icu_dir`, with one
/// data file per endianness letter and a single `common` source file.
pub fn write_icu_tree(icu_dir: &Path, major: u32, endianness: &[char]) {
    let common = icu_dir.join("source").join("common");
    fs::create_dir_all(common.join("unicode")).unwrap();
    fs::write(
        common.join("unicode").join("uvernum.h"),
        format!(
            "#define U_ICU_VERSION_MAJOR_NUM {major}\n#define U_ICU_VERSION_SHORT \"{major}\"\n"
        ),
    )
    .unwrap();
    fs::write(common.join("uloc.cpp"), "// uloc\n").unwrap();

    let data_in = icu_dir.join("source").join("data").join("in");
    fs::create_dir_all(&data_in).unwrap();
    for letter in endianness {
        fs::write(data_in.join(format!("icudt{}{}.dat", major, letter)), b"icu").unwrap();
    }
}

/// Write a gzipped tarball at `path` holding `files` (path, contents).
pub fn write_tarball(path: &Path, files: &[(&str, &str)]) {
    let file = fs::File::create(path).unwrap();
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, contents) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, contents.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap();
}

/// Write a zip archive at `path` holding `files`.
pub fn write_zip(path: &Path, files: &[(&str, &str)]) {
    let file = fs::File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    for (name, contents) in files {
        writer
            .start_file(*name, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}
