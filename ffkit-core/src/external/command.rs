// ============================================================================
// ffkit-core/src/external/command.rs
// ============================================================================
//
// COMMAND COMPILATION: ParameterSet -> CommandSpec
//
// Compiles an immutable ParameterSet into the ordered argv of one ffmpeg
// invocation:
//
//     <binary> [-i <input>] <tokens in insertion order> <output-or-null>
//
// Every token is a separate argv element. The shell-quoted command line is
// only used for logging and error messages.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use crate::error::{CoreError, CoreResult};
use crate::params::{Param, ParamValue, ParameterSet, UseCase};

/// Platform null sink used when a run only produces diagnostics.
#[cfg(windows)]
pub const NULL_SINK: &str = "NUL";
#[cfg(not(windows))]
pub const NULL_SINK: &str = "/dev/null";

const VALUE_PLACEHOLDER: &str = "{}";

/// Where a compiled command writes its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSink {
    Path(PathBuf),
    /// Discard the output (`/dev/null`, or `NUL` on Windows)
    Null,
}

impl OutputSink {
    #[must_use]
    pub fn as_os_str(&self) -> &OsStr {
        match self {
            OutputSink::Path(path) => path.as_os_str(),
            OutputSink::Null => OsStr::new(NULL_SINK),
        }
    }
}

impl From<PathBuf> for OutputSink {
    fn from(path: PathBuf) -> Self {
        OutputSink::Path(path)
    }
}

impl From<&Path> for OutputSink {
    fn from(path: &Path) -> Self {
        OutputSink::Path(path.to_path_buf())
    }
}

/// A fully assembled command: binary plus ordered argv.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    binary: PathBuf,
    args: Vec<OsString>,
    input: Option<PathBuf>,
    output: Option<OutputSink>,
}

impl CommandSpec {
    /// Builds a command from a raw argument list.
    pub fn from_args<I, A>(binary: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        Self {
            binary: binary.into(),
            args: args.into_iter().map(Into::into).collect(),
            input: None,
            output: None,
        }
    }

    /// Records the input file the arguments refer to.
    #[must_use]
    pub fn with_input(mut self, input: impl Into<PathBuf>) -> Self {
        self.input = Some(input.into());
        self
    }

    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    #[must_use]
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    #[must_use]
    pub fn input(&self) -> Option<&Path> {
        self.input.as_deref()
    }

    #[must_use]
    pub fn output(&self) -> Option<&OutputSink> {
        self.output.as_ref()
    }

    /// Arguments as lossy UTF-8 strings.
    #[must_use]
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    /// Human-readable command line with every token shell-quoted.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.binary.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|token| quote_arg(&token.to_string_lossy()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// std::process::Command with the binary and arguments applied.
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.binary);
        command.args(&self.args);
        command
    }
}

/// Quotes `arg` for display in a POSIX shell.
#[must_use]
pub fn quote_arg(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_+=/.,:@%^".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Compiles parameter sets into commands for one binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandCompiler {
    binary: PathBuf,
}

impl CommandCompiler {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Compiles `params` into a complete command.
    ///
    /// # Arguments
    ///
    /// * `params` - Parameters in the order they should appear
    /// * `input` - Input file passed with `-i`, omitted when `None`
    /// * `output` - Output path or the null sink
    ///
    /// # Returns
    ///
    /// * `Ok(CommandSpec)` - The compiled command
    /// * `Err(CoreError::UnsupportedParamValue)` - A value the pattern cannot render
    /// * `Err(CoreError::CommandBuild)` - Empty output path, or output equal to input
    pub fn compile<U: UseCase>(
        &self,
        params: &ParameterSet<U>,
        input: Option<&Path>,
        output: impl Into<OutputSink>,
    ) -> CoreResult<CommandSpec> {
        let output = output.into();
        if let OutputSink::Path(path) = &output {
            if path.as_os_str().is_empty() {
                return Err(CoreError::CommandBuild("output path is empty".to_string()));
            }
            if input == Some(path.as_path()) {
                return Err(CoreError::CommandBuild(format!(
                    "output path {} is the same as the input",
                    path.display()
                )));
            }
        }

        let mut args: Vec<OsString> = Vec::new();
        if let Some(input) = input {
            args.push("-i".into());
            args.push(input.as_os_str().to_owned());
        }
        args.extend(compile_params(params)?.into_iter().map(OsString::from));
        args.push(output.as_os_str().to_owned());

        let spec = CommandSpec {
            binary: self.binary.clone(),
            args,
            input: input.map(Path::to_path_buf),
            output: Some(output),
        };
        debug!("Compiled {} command: {}", U::NAME, spec.command_line());
        Ok(spec)
    }
}

/// Expands `params`, with use-case defaults injected, into ordered tokens.
pub fn compile_params<U: UseCase>(params: &ParameterSet<U>) -> CoreResult<Vec<String>> {
    let mut tokens = Vec::new();
    for (param, value) in params.with_defaults().iter() {
        let pattern = U::pattern(param).ok_or_else(|| CoreError::UnsupportedParameter {
            param: param.name().to_string(),
            use_case: U::NAME,
        })?;
        tokens.extend(expand(param, pattern, value)?);
    }
    Ok(tokens)
}

fn expand(param: Param, pattern: &str, value: &ParamValue) -> CoreResult<Vec<String>> {
    let unsupported = || CoreError::UnsupportedParamValue {
        param: param.name().to_string(),
        value_type: value.type_name(),
    };

    if !pattern.contains(VALUE_PLACEHOLDER) {
        return match value {
            ParamValue::Bool(true) => Ok(pattern.split_whitespace().map(String::from).collect()),
            ParamValue::Bool(false) => Ok(Vec::new()),
            _ => Err(unsupported()),
        };
    }

    let rendered = match value {
        ParamValue::Int(number) => number.to_string(),
        ParamValue::Text(text) => text.clone(),
        ParamValue::Filter(filter) => filter.render(),
        ParamValue::Bool(_) => return Err(unsupported()),
    };
    // An empty value (usually an EmptyFilter) drops the whole option.
    if rendered.is_empty() {
        return Ok(Vec::new());
    }

    Ok(pattern
        .split_whitespace()
        .map(|token| {
            if token == VALUE_PLACEHOLDER {
                rendered.clone()
            } else {
                token.replace(VALUE_PLACEHOLDER, &rendered)
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{EmptyFilter, FilterChain, IdetFilter, YadifFilter};
    use crate::params::{ConvertParams, SeekTime, ThumbnailParams};

    fn compiler() -> CommandCompiler {
        CommandCompiler::new("ffmpeg")
    }

    #[test]
    fn test_compile_orders_tokens_and_injects_defaults() {
        let params = ConvertParams::new().with_video_codec("h264").with_crf(20);
        let spec = compiler()
            .compile(&params, Some(Path::new("in.mp4")), PathBuf::from("out.mp4"))
            .unwrap();

        assert_eq!(
            spec.args_lossy(),
            vec!["-i", "in.mp4", "-c:v", "h264", "-crf", "20", "-y", "out.mp4"]
        );
        assert_eq!(spec.command_line(), "ffmpeg -i in.mp4 -c:v h264 -crf 20 -y out.mp4");
    }

    #[test]
    fn test_explicit_false_flag_suppresses_default() {
        let params = ConvertParams::new().with_overwrite(false).with_no_audio(true);
        let tokens = compile_params(&params).unwrap();
        assert_eq!(tokens, vec!["-an"]);
    }

    #[test]
    fn test_multi_token_flag_pattern() {
        let params = ConvertParams::new().with_streamable(true);
        assert_eq!(
            compile_params(&params).unwrap(),
            vec!["-movflags", "+faststart", "-y"]
        );
    }

    #[test]
    fn test_value_with_spaces_stays_one_argument() {
        let params = ConvertParams::new()
            .with_video_filter(crate::filters::RawFilter::new("drawtext=text='a b'"));
        let spec = compiler()
            .compile(&params, None, PathBuf::from("out file.mp4"))
            .unwrap();

        assert_eq!(
            spec.args_lossy(),
            vec!["-filter:v", "drawtext=text='a b'", "-y", "out file.mp4"]
        );
        assert_eq!(
            spec.command_line(),
            r"ffmpeg -filter:v 'drawtext=text='\''a b'\''' -y 'out file.mp4'"
        );
    }

    #[test]
    fn test_filter_chain_is_rendered() {
        let chain = FilterChain::new()
            .add_filter(YadifFilter::default())
            .add_filter(IdetFilter);
        let params = ConvertParams::new().with_video_filter(chain);
        assert_eq!(
            compile_params(&params).unwrap(),
            vec!["-filter:v", "yadif=mode=0:parity=-1:deint=0,idet", "-y"]
        );
    }

    #[test]
    fn test_empty_filter_drops_option() {
        let params = ConvertParams::new().with_video_filter(EmptyFilter);
        assert_eq!(compile_params(&params).unwrap(), vec!["-y"]);
    }

    #[test]
    fn test_value_shape_mismatch_reported_at_compile_time() {
        let params = ConvertParams::new().with(Param::Crf, true).unwrap();
        let err = compile_params(&params).unwrap_err();
        assert!(matches!(
            err,
            CoreError::UnsupportedParamValue { ref param, value_type: "bool" } if param == "crf"
        ));

        let params = ConvertParams::new().with(Param::NoAudio, "yes").unwrap();
        let err = compile_params(&params).unwrap_err();
        assert!(matches!(
            err,
            CoreError::UnsupportedParamValue { ref param, value_type: "text" } if param == "no_audio"
        ));
    }

    #[test]
    fn test_thumbnail_defaults_and_null_sink() {
        let params = ThumbnailParams::new().with_time(SeekTime::from_millis(12_500));
        let spec = compiler()
            .compile(&params, Some(Path::new("in.mkv")), OutputSink::Null)
            .unwrap();
        assert_eq!(
            spec.args_lossy(),
            vec!["-i", "in.mkv", "-ss", "0:00:12.500", "-y", "-frames:v", "1", NULL_SINK]
        );
        assert_eq!(spec.output(), Some(&OutputSink::Null));
        assert_eq!(spec.input(), Some(Path::new("in.mkv")));
    }

    #[test]
    fn test_rejects_bad_output() {
        let params = ConvertParams::new();
        let err = compiler()
            .compile(&params, Some(Path::new("a.mp4")), PathBuf::new())
            .unwrap_err();
        assert!(matches!(err, CoreError::CommandBuild(_)));

        let err = compiler()
            .compile(&params, Some(Path::new("a.mp4")), PathBuf::from("a.mp4"))
            .unwrap_err();
        assert!(matches!(err, CoreError::CommandBuild(_)));
    }

    #[test]
    fn test_quote_arg() {
        assert_eq!(quote_arg("-c:v"), "-c:v");
        assert_eq!(quote_arg("scale=w=1280:h=720"), "scale=w=1280:h=720");
        assert_eq!(quote_arg(""), "''");
        assert_eq!(quote_arg("it's"), r"'it'\''s'");
        assert_eq!(quote_arg("a;rm -rf"), "'a;rm -rf'");
    }

    #[test]
    fn test_from_args_keeps_raw_order() {
        let spec = CommandSpec::from_args("ffprobe", ["-v", "quiet", "in.mp4"]).with_input("in.mp4");
        assert_eq!(spec.args_lossy(), vec!["-v", "quiet", "in.mp4"]);
        assert_eq!(spec.output(), None);
        assert_eq!(spec.input(), Some(Path::new("in.mp4")));
    }
}
